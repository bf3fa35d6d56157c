// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matching test blocks to runner assertions by context.
//!
//! Runner output identifies tests by name, and names in source code aren't always known
//! statically (template literals, `it.each`). The matcher therefore leans on the structure shared
//! by both sides: within one `describe` scope, the source and the runner usually report the same
//! blocks in the same order. Names and reported locations are used as fallbacks.
//!
//! The main entry point is [`ContextMatcher`]. Match decisions are reported through a
//! [`MatchObserver`].

mod context;
mod list;
mod messages;

pub use context::*;
pub use messages::*;

/// Options controlling how sibling lists are matched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatcherOptions {
    /// Pair siblings by position when both sides report the same number of them.
    pub sequence: bool,

    /// Match the remaining test blocks by the location the runner reported.
    pub location_fallback: bool,

    /// Accept equal local names when either side is missing its ancestor titles.
    pub local_name_fallback: bool,

    /// Report runner nodes that weren't claimed by any source block.
    pub report_unmatched_assertions: bool,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            sequence: true,
            location_fallback: true,
            local_name_fallback: true,
            report_unmatched_assertions: true,
        }
    }
}
