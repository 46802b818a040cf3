// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Typed multicast registry
//!
//! [`EventDispatcher`] maps an event kind to an ordered list of handlers.
//! Dispatching an event invokes every handler registered for exactly its
//! kind, in registration order; when none is registered the single default
//! handler receives it instead. The same handler can be subscribed to
//! several kinds by sharing the [`SharedHandler`] returned on registration.
//!
//! Handlers are plain closures, so the registry is single-threaded (`Rc`)
//! and meant to live on the thread that consumes events.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::event::{GroupAnnounce, ListEvent, OutputEvent, TestAnnounce};
use crate::handler::{ListHandler, OutputHandler};
use crate::route_to_handle;

/// An event enum with a copyable discriminant
pub trait Tagged {
    /// Discriminant type used as the registry key
    type Kind: Copy + Eq + Hash + fmt::Debug;

    /// Discriminant of this event
    fn kind(&self) -> Self::Kind;
}

/// A payload type that is exactly one variant of `E`
pub trait Variant<E: Tagged> {
    /// Kind of the variant carrying `Self`
    const KIND: E::Kind;

    /// Borrow the payload if `event` is this variant
    fn from_event(event: &E) -> Option<&Self>;
}

/// Handler as stored in the registry; clone it to subscribe it again
pub type SharedHandler<E> = Rc<RefCell<dyn FnMut(&E)>>;

/// Registry of handlers keyed by event kind
pub struct EventDispatcher<E: Tagged> {
    handlers: HashMap<E::Kind, Vec<SharedHandler<E>>>,
    default_handler: Box<dyn FnMut(&E)>,
}

impl<E: Tagged + 'static> EventDispatcher<E> {
    /// Create a registry whose unhandled events go to `default_handler`
    #[must_use]
    pub fn new(default_handler: impl FnMut(&E) + 'static) -> Self {
        Self {
            handlers: HashMap::new(),
            default_handler: Box::new(default_handler),
        }
    }

    /// Create a registry that drops unhandled events
    #[must_use]
    pub fn ignoring_unhandled() -> Self {
        Self::new(|_| {})
    }

    /// Register `handler` for events of `kind`
    ///
    /// Returns the stored handle so the same closure can also be
    /// [`subscribe`](Self::subscribe)d to other kinds.
    pub fn add_handler(
        &mut self,
        kind: E::Kind,
        handler: impl FnMut(&E) + 'static,
    ) -> SharedHandler<E> {
        let shared: SharedHandler<E> = Rc::new(RefCell::new(handler));
        self.subscribe(kind, &shared);
        shared
    }

    /// Subscribe an already registered handler to another kind
    pub fn subscribe(&mut self, kind: E::Kind, handler: &SharedHandler<E>) {
        self.handlers
            .entry(kind)
            .or_default()
            .push(Rc::clone(handler));
    }

    /// Register a handler for one payload type
    ///
    /// The closure receives the payload instead of the whole event.
    pub fn on<V>(&mut self, mut handler: impl FnMut(&V) + 'static) -> SharedHandler<E>
    where
        V: Variant<E> + 'static,
    {
        self.add_handler(V::KIND, move |event: &E| {
            if let Some(payload) = V::from_event(event) {
                handler(payload);
            }
        })
    }

    /// Deliver `event` to its handlers, or to the default handler if none
    pub fn dispatch(&mut self, event: &E) {
        match self.handlers.get(&event.kind()) {
            Some(handlers) if !handlers.is_empty() => {
                for handler in handlers {
                    (&mut *handler.borrow_mut())(event);
                }
            }
            _ => (self.default_handler)(event),
        }
    }

    /// Number of handlers registered for `kind`
    #[must_use]
    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Whether events of `kind` bypass the default handler
    #[must_use]
    pub fn is_handled(&self, kind: E::Kind) -> bool {
        self.handler_count(kind) > 0
    }
}

impl<E: Tagged> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(E::Kind, usize)> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.len()))
            .collect();
        counts.sort_by_key(|(kind, _)| format!("{kind:?}"));
        f.debug_struct("EventDispatcher")
            .field("handlers", &counts)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Capability adapters
// ============================================================================

impl OutputHandler for EventDispatcher<OutputEvent> {
    fn test_output(&mut self, line: &str, group: Option<&str>, test: Option<&str>) {
        self.dispatch(&OutputEvent::test_output(line, group, test));
    }

    route_to_handle!();

    fn handle(&mut self, event: &OutputEvent) {
        self.dispatch(event);
    }
}

impl ListHandler for EventDispatcher<ListEvent> {
    fn group_announce(&mut self, event: &GroupAnnounce) {
        self.dispatch(&event.clone().into());
    }

    fn test_announce(&mut self, event: &TestAnnounce) {
        self.dispatch(&event.clone().into());
    }

    fn handle(&mut self, event: &ListEvent) {
        self.dispatch(event);
    }
}
