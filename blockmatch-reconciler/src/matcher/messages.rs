// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use blockmatch_metadata::MatchEvent;
use std::fmt;
use tracing::{debug, info, warn};

/// Which kind of node a message is about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeLabel {
    /// An `it`/`test` block.
    Test,

    /// A `describe` block.
    Describe,
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Describe => write!(f, "describe"),
        }
    }
}

/// A diagnostic message emitted while matching.
///
/// Messages are informational only: observers can't influence the results.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchMessage<'a> {
    /// A source node was matched.
    Matched {
        /// The kind of node.
        label: NodeLabel,
        /// The source node's full name.
        source: &'a str,
        /// The matched runner node's full name.
        assertion: &'a str,
        /// How the match was made.
        event: MatchEvent,
    },

    /// A source node could not be matched.
    Unmatched {
        /// The kind of node.
        label: NodeLabel,
        /// The source node's full name.
        source: &'a str,
        /// The number of candidates found.
        candidates: usize,
        /// The failure event recorded.
        event: MatchEvent,
    },

    /// A source node's name is shared by other siblings, so it can't be matched by name.
    DuplicateName {
        /// The kind of node.
        label: NodeLabel,
        /// The duplicated full name.
        source: &'a str,
        /// The number of siblings sharing the name.
        count: usize,
    },

    /// A test was matched by context, but neither its name nor its position agree with the
    /// assertion's.
    UnusualMatch {
        /// The source node's full name.
        source: &'a str,
        /// The assertion's full name.
        assertion: &'a str,
        /// The source node's 0-based line.
        source_line: Option<u32>,
        /// The assertion's 0-based line.
        assertion_line: Option<u32>,
    },

    /// A runner node was not claimed by any source node.
    UnmatchedAssertion {
        /// The kind of node.
        label: NodeLabel,
        /// The runner node's full name.
        assertion: &'a str,
        /// The runner node's 0-based line.
        line: Option<u32>,
    },

    /// Two source test blocks start on the same line.
    SharedSourceLine {
        /// The first block's full name.
        first: &'a str,
        /// The second block's full name.
        second: &'a str,
        /// The shared 0-based line.
        line: u32,
    },
}

impl MatchMessage<'_> {
    /// Returns true if this message points at a likely problem in the inputs.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::SharedSourceLine { .. })
    }
}

impl fmt::Display for MatchMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Matched {
                label,
                source,
                assertion,
                event,
            } => write!(f, "{label} `{source}` matched `{assertion}` ({event})"),
            Self::Unmatched {
                label,
                source,
                candidates,
                event,
            } => write!(
                f,
                "{label} `{source}` not matched: found {candidates} candidate(s) ({event})"
            ),
            Self::DuplicateName {
                label,
                source,
                count,
            } => write!(
                f,
                "{label} name `{source}` is shared by {count} siblings, can't match by name"
            ),
            Self::UnusualMatch {
                source,
                assertion,
                source_line,
                assertion_line,
            } => write!(
                f,
                "test `{source}` (line {}) matched by context to `{assertion}` (line {}), \
                 but neither name nor position agree",
                DisplayLine(*source_line),
                DisplayLine(*assertion_line),
            ),
            Self::UnmatchedAssertion {
                label,
                assertion,
                line,
            } => write!(
                f,
                "runner {label} `{assertion}` (line {}) was not claimed by any source block",
                DisplayLine(*line)
            ),
            Self::SharedSourceLine {
                first,
                second,
                line,
            } => write!(
                f,
                "test blocks `{first}` and `{second}` both start at line {line}"
            ),
        }
    }
}

struct DisplayLine(Option<u32>);

impl fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, "{line}"),
            None => write!(f, "unknown"),
        }
    }
}

/// Receives diagnostic messages from the matcher.
pub trait MatchObserver {
    /// Called for every message.
    fn observe(&mut self, message: &MatchMessage<'_>);
}

impl<F> MatchObserver for F
where
    F: FnMut(&MatchMessage<'_>),
{
    fn observe(&mut self, message: &MatchMessage<'_>) {
        self(message)
    }
}

/// An observer that discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl MatchObserver for NoopObserver {
    fn observe(&mut self, _message: &MatchMessage<'_>) {}
}

/// An observer that logs messages through `tracing`.
///
/// Warnings are always logged at warn level. Other messages are logged at debug level, or at
/// info level if `verbose` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver {
    verbose: bool,
}

impl TracingObserver {
    /// Creates a new observer.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl MatchObserver for TracingObserver {
    fn observe(&mut self, message: &MatchMessage<'_>) {
        if message.is_warning() {
            warn!("{message}");
        } else if self.verbose {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }
}

/// An observer that collects rendered messages, mostly useful for tests and tooling.
#[derive(Clone, Debug, Default)]
pub struct CollectingObserver {
    messages: Vec<String>,
}

impl CollectingObserver {
    /// Returns the messages collected so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl MatchObserver for CollectingObserver {
    fn observe(&mut self, message: &MatchMessage<'_>) {
        self.messages.push(message.to_string());
    }
}
