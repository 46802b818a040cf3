// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Tiny combinator DSL for regex-driven line classification
//!
//! A [`LineParser`] inspects one line and either yields a [`LineMatch`]
//! (the whole line plus its positional capture groups) or `None`. Parsers
//! compose:
//!
//! - [`first_of`] tries alternatives in order and commits to the first
//!   success, so a specific pattern must come before a general one that
//!   would also accept its input.
//! - [`LineParser::then`] runs an action on success only, without changing
//!   the match result.
//! - [`LineParser::when`] gates a parser on the caller's state; a closed
//!   gate behaves like a non-match.
//!
//! Actions receive a mutable context `C` threaded through `parse`, which is
//! how a classifier lets its rules update its own state.
//!
//! # Example
//!
//! ```
//! use gtest_lens_parser::pattern::{LineParser, first_of, if_matches_str};
//!
//! let mut seen: Vec<String> = Vec::new();
//! let parser = first_of()
//!     .or(if_matches_str(r"^digit (\d)$")
//!         .unwrap()
//!         .then(|seen: &mut Vec<String>, m| seen.push(m.line().to_string())))
//!     .or(if_matches_str(r"^word (\w+)$").unwrap());
//!
//! assert!(parser.parse(&mut seen, "digit 7").is_some());
//! assert!(parser.parse(&mut seen, "word seven").is_some());
//! assert!(parser.parse(&mut seen, "nothing").is_none());
//! assert_eq!(seen, vec!["digit 7".to_string()]);
//! ```

use std::fmt;

use regex::Regex;

use crate::error::ParserError;

/// Result of a successful line match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    line: String,
    captures: Vec<Option<String>>,
}

impl LineMatch {
    /// Build a match from a line and its capture groups (group 0 excluded)
    #[must_use]
    pub fn new(line: impl Into<String>, captures: Vec<Option<String>>) -> Self {
        Self {
            line: line.into(),
            captures,
        }
    }

    fn from_regex(line: &str, caps: &regex::Captures<'_>) -> Self {
        let captures = caps
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        Self::new(line, captures)
    }

    /// The whole input line
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// All capture groups in pattern order
    ///
    /// A group that did not participate in the match is `None`; a group
    /// that matched the empty string is `Some("")`.
    #[must_use]
    pub fn captures(&self) -> &[Option<String>] {
        &self.captures
    }

    /// Capture group by 1-based index, as numbered in the pattern
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.captures.get(i))
            .and_then(|group| group.as_deref())
    }

    /// Capture group parsed as a base-10 count
    ///
    /// Returns `None` when the group is absent or holds anything but ASCII
    /// digits. Values too large for `usize` saturate.
    #[must_use]
    pub fn count(&self, index: usize) -> Option<usize> {
        self.get(index).and_then(parse_digits).map(|value| {
            usize::try_from(value).unwrap_or(usize::MAX)
        })
    }

    /// Capture group parsed as a duration in milliseconds
    #[must_use]
    pub fn millis(&self, index: usize) -> Option<u64> {
        self.get(index).and_then(parse_digits)
    }
}

fn parse_digits(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(text.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    }))
}

/// Something that can recognize a line, optionally updating a context `C`
pub trait LineParser<C> {
    /// Try to match `line`
    ///
    /// A failed match must leave `ctx` untouched.
    fn parse(&self, ctx: &mut C, line: &str) -> Option<LineMatch>;

    /// Run `action` after every successful match
    fn then<F>(self, action: F) -> Then<Self, F>
    where
        Self: Sized,
        F: Fn(&mut C, &LineMatch),
    {
        Then {
            parser: self,
            action,
        }
    }

    /// Only try this parser while `gate` holds for the current context
    fn when<G>(self, gate: G) -> When<Self, G>
    where
        Self: Sized,
        G: Fn(&C) -> bool,
    {
        When { parser: self, gate }
    }
}

/// Regex-backed parser, see [`if_matches`]
#[derive(Debug, Clone)]
pub struct Matches {
    regex: Regex,
}

impl Matches {
    /// The underlying pattern
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl<C> LineParser<C> for Matches {
    fn parse(&self, _ctx: &mut C, line: &str) -> Option<LineMatch> {
        self.regex
            .captures(line)
            .map(|caps| LineMatch::from_regex(line, &caps))
    }
}

/// Parser that accepts lines matching `regex`
#[must_use]
pub fn if_matches(regex: Regex) -> Matches {
    Matches { regex }
}

/// Compile `pattern` and build a parser for it
///
/// # Errors
///
/// Returns `ParserError::InvalidPattern` if the pattern does not compile.
pub fn if_matches_str(pattern: &str) -> Result<Matches, ParserError> {
    Ok(if_matches(Regex::new(pattern)?))
}

/// Parser built from a plain function, see [`from_fn`]
#[derive(Clone)]
pub struct FnParser<F> {
    func: F,
}

impl<F> fmt::Debug for FnParser<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnParser").finish_non_exhaustive()
    }
}

impl<C, F> LineParser<C> for FnParser<F>
where
    F: Fn(&str) -> Option<LineMatch>,
{
    fn parse(&self, _ctx: &mut C, line: &str) -> Option<LineMatch> {
        (self.func)(line)
    }
}

/// Wrap a context-free matching function as a parser
#[must_use]
pub fn from_fn<F>(func: F) -> FnParser<F>
where
    F: Fn(&str) -> Option<LineMatch>,
{
    FnParser { func }
}

/// See [`LineParser::then`]
#[derive(Clone)]
pub struct Then<P, F> {
    parser: P,
    action: F,
}

impl<P: fmt::Debug, F> fmt::Debug for Then<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Then")
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

impl<C, P, F> LineParser<C> for Then<P, F>
where
    P: LineParser<C>,
    F: Fn(&mut C, &LineMatch),
{
    fn parse(&self, ctx: &mut C, line: &str) -> Option<LineMatch> {
        let matched = self.parser.parse(ctx, line)?;
        (self.action)(ctx, &matched);
        Some(matched)
    }
}

/// See [`LineParser::when`]
#[derive(Clone)]
pub struct When<P, G> {
    parser: P,
    gate: G,
}

impl<P: fmt::Debug, G> fmt::Debug for When<P, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

impl<C, P, G> LineParser<C> for When<P, G>
where
    P: LineParser<C>,
    G: Fn(&C) -> bool,
{
    fn parse(&self, ctx: &mut C, line: &str) -> Option<LineMatch> {
        if (self.gate)(ctx) {
            self.parser.parse(ctx, line)
        } else {
            None
        }
    }
}

type BoxedParser<C> = Box<dyn LineParser<C> + Send + Sync>;

/// Ordered alternatives with short-circuit semantics, see [`first_of`]
pub struct FirstOf<C> {
    alternatives: Vec<BoxedParser<C>>,
}

impl<C> FirstOf<C> {
    /// Append an alternative, tried after all previously added ones
    #[must_use]
    pub fn or<P>(mut self, parser: P) -> Self
    where
        P: LineParser<C> + Send + Sync + 'static,
    {
        self.alternatives.push(Box::new(parser));
        self
    }

    /// Number of alternatives
    #[must_use]
    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Whether no alternative has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl<C> fmt::Debug for FirstOf<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstOf")
            .field("alternatives", &self.alternatives.len())
            .finish()
    }
}

impl<C> LineParser<C> for FirstOf<C> {
    fn parse(&self, ctx: &mut C, line: &str) -> Option<LineMatch> {
        self.alternatives
            .iter()
            .find_map(|parser| parser.parse(ctx, line))
    }
}

/// Start an empty list of ordered alternatives
///
/// An empty `FirstOf` matches nothing.
#[must_use]
pub fn first_of<C>() -> FirstOf<C> {
    FirstOf {
        alternatives: Vec::new(),
    }
}
