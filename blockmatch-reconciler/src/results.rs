// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summaries of reconciled results.

use blockmatch_metadata::{TestReconciliationState, TestResult};

/// Results partitioned by status, as an editor would decorate them.
///
/// Todo results are counted as skipped.
#[derive(Clone, Debug, Default)]
pub struct SortedTestResults<'a> {
    /// Failed tests.
    pub fail: Vec<&'a TestResult>,

    /// Skipped and todo tests.
    pub skip: Vec<&'a TestResult>,

    /// Passed tests.
    pub success: Vec<&'a TestResult>,

    /// Tests with an unknown status, including every unmatched test block.
    pub unknown: Vec<&'a TestResult>,
}

impl<'a> SortedTestResults<'a> {
    /// Partitions the top-level results, keeping their order within each bucket.
    pub fn new(results: &'a [TestResult]) -> Self {
        let mut sorted = Self::default();
        for result in results {
            let bucket = match result.status {
                TestReconciliationState::KnownFail => &mut sorted.fail,
                TestReconciliationState::KnownSkip | TestReconciliationState::KnownTodo => {
                    &mut sorted.skip
                }
                TestReconciliationState::KnownSuccess => &mut sorted.success,
                TestReconciliationState::Unknown => &mut sorted.unknown,
            };
            bucket.push(result);
        }
        sorted
    }

    /// Returns the total number of results.
    pub fn total(&self) -> usize {
        self.fail.len() + self.skip.len() + self.success.len() + self.unknown.len()
    }

    /// Returns true if any test failed.
    pub fn has_failures(&self) -> bool {
        !self.fail.is_empty()
    }

    /// Returns the results whose test block couldn't be matched to any assertion.
    pub fn unmatched(&self) -> impl Iterator<Item = &'a TestResult> + '_ {
        self.unknown
            .iter()
            .copied()
            .filter(|result| !result.is_matched())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmatch_metadata::{MatchEvent, TestIdentifier, ZeroBasedLocation};
    use pretty_assertions::assert_eq;

    fn result(name: &str, status: TestReconciliationState, matched: bool) -> TestResult {
        TestResult {
            name: name.to_owned(),
            identifier: TestIdentifier {
                title: name.to_owned(),
                ancestor_titles: Vec::new(),
            },
            status,
            start: ZeroBasedLocation { line: 0, column: 0 },
            end: ZeroBasedLocation { line: 1, column: 0 },
            short_message: None,
            terse_message: None,
            line_number_of_error: None,
            multi_results: Vec::new(),
            source_history: vec![if matched {
                MatchEvent::MatchByName
            } else {
                MatchEvent::MatchFailed
            }],
            assertion_history: Vec::new(),
        }
    }

    #[test]
    fn partitions_by_status() {
        let results = vec![
            result("a", TestReconciliationState::KnownSuccess, true),
            result("b", TestReconciliationState::KnownFail, true),
            result("c", TestReconciliationState::KnownTodo, true),
            result("d", TestReconciliationState::KnownSkip, true),
            result("e", TestReconciliationState::Unknown, true),
            result("f", TestReconciliationState::Unknown, false),
        ];

        let sorted = SortedTestResults::new(&results);
        let names = |bucket: &[&TestResult]| {
            bucket
                .iter()
                .map(|result| result.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&sorted.fail), ["b"]);
        assert_eq!(names(&sorted.skip), ["c", "d"]);
        assert_eq!(names(&sorted.success), ["a"]);
        assert_eq!(names(&sorted.unknown), ["e", "f"]);
        assert_eq!(sorted.total(), 6);
        assert!(sorted.has_failures());
        assert_eq!(
            sorted.unmatched().map(|result| result.name.as_str()).collect::<Vec<_>>(),
            ["f"]
        );
    }
}
