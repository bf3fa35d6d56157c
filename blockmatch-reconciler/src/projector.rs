// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Projection of matched nodes into [`TestResult`]s.
//!
//! Source and runner positions are 1-based. Results are 0-based, ready for an editor to
//! decorate.

use crate::tree::{DataNode, TreeNode};
use blockmatch_metadata::{
    ItBlock, Location, RunnerAssertion, TestIdentifier, TestReconciliationState, TestResult,
    ZeroBasedLocation,
};

/// Builds the result for a test block matched to a single assertion.
pub fn matched_result(
    source: &DataNode<ItBlock>,
    assertion: &DataNode<RunnerAssertion>,
) -> TestResult {
    let block = source.data();
    let data = assertion.data();

    TestResult {
        name: data.full_name.clone().unwrap_or_else(|| data.title.clone()),
        identifier: TestIdentifier {
            title: data.title.clone(),
            ancestor_titles: data.ancestor_titles.clone(),
        },
        status: data.status,
        start: zero_based(block.start),
        end: zero_based(block.end),
        short_message: data.short_message.clone(),
        terse_message: data.terse_message.clone(),
        line_number_of_error: Some(line_number_of_error(block, data)),
        multi_results: Vec::new(),
        source_history: source.history().snapshot(),
        assertion_history: assertion.history().snapshot(),
    }
}

/// Builds the result for a test block matched to a group of assertions.
///
/// The primary assertion determines the result. Every other assertion becomes an entry in
/// `multi_results`, in the order given.
pub fn grouped_result<'a>(
    source: &DataNode<ItBlock>,
    primary: &DataNode<RunnerAssertion>,
    rest: impl IntoIterator<Item = &'a DataNode<RunnerAssertion>>,
) -> TestResult {
    let mut result = matched_result(source, primary);
    result.multi_results = rest
        .into_iter()
        .map(|assertion| matched_result(source, assertion))
        .collect();
    result
}

/// Builds the result for a test block that couldn't be matched.
///
/// The status is [`TestReconciliationState::Unknown`], and `reason` is reported as the short
/// message.
pub fn unmatched_result(source: &DataNode<ItBlock>, reason: impl Into<String>) -> TestResult {
    let block = source.data();

    TestResult {
        name: block.name.clone(),
        identifier: TestIdentifier {
            title: source.name().to_owned(),
            ancestor_titles: source.base().ancestor_titles().to_vec(),
        },
        status: TestReconciliationState::Unknown,
        start: zero_based(block.start),
        end: zero_based(block.end),
        short_message: Some(reason.into()),
        terse_message: None,
        line_number_of_error: None,
        multi_results: Vec::new(),
        source_history: source.history().snapshot(),
        assertion_history: Vec::new(),
    }
}

fn zero_based(location: Location) -> ZeroBasedLocation {
    ZeroBasedLocation {
        line: location.line.saturating_sub(1),
        column: location.column,
    }
}

/// Runner lines can point outside the block (source maps drift), so anything outside the
/// block's range falls back to the block's end line.
fn line_number_of_error(block: &ItBlock, assertion: &RunnerAssertion) -> u32 {
    let line = match assertion.error_line() {
        Some(line) if (block.start.line..=block.end.line).contains(&line) => line,
        _ => block.end.line,
    };
    line.saturating_sub(1)
}
