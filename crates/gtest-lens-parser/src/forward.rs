// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Hand events to another execution context
//!
//! The classifier must never block on its consumer. [`EventForwarder`]
//! clones each event into an unbounded channel and returns immediately;
//! the receiving side (a UI task, a renderer) gets the events in exactly
//! the order the classifier produced them.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::event::{GroupAnnounce, ListEvent, OutputEvent, TestAnnounce};
use crate::handler::{ListHandler, OutputHandler};
use crate::route_to_handle;

/// Handler that forwards every event over a channel
#[derive(Debug)]
pub struct EventForwarder<E> {
    sender: UnboundedSender<E>,
    dropped: usize,
}

/// Create a forwarder and the receiver its events arrive on
#[must_use]
pub fn channel<E>() -> (EventForwarder<E>, UnboundedReceiver<E>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (EventForwarder::new(sender), receiver)
}

impl<E> EventForwarder<E> {
    /// Forward over an existing sender
    #[must_use]
    pub fn new(sender: UnboundedSender<E>) -> Self {
        Self { sender, dropped: 0 }
    }

    /// Send `event` without waiting
    ///
    /// Returns `false` if the receiver is gone and the event was dropped.
    pub fn send(&mut self, event: E) -> bool {
        if self.sender.send(event).is_ok() {
            return true;
        }
        if self.dropped == 0 {
            debug!("Event receiver closed, discarding further events");
        }
        self.dropped += 1;
        false
    }

    /// Whether the receiving side has been dropped
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Number of events discarded because the receiver was gone
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl OutputHandler for EventForwarder<OutputEvent> {
    fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>) {
        self.send(OutputEvent::test_output(line, group, test));
    }

    route_to_handle!();

    fn handle(&mut self, event: &OutputEvent) {
        self.send(event.clone());
    }
}

impl ListHandler for EventForwarder<ListEvent> {
    fn group_announce(&mut self, event: &GroupAnnounce) {
        self.send(event.clone().into());
    }

    fn test_announce(&mut self, event: &TestAnnounce) {
        self.send(event.clone().into());
    }

    fn handle(&mut self, event: &ListEvent) {
        self.send(event.clone());
    }
}
