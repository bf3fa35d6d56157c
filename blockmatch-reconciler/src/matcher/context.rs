// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    list::{match_list, ListOutcome, ListPhases, UnmatchedReason},
    MatchMessage, MatchObserver, MatcherOptions, NodeLabel,
};
use crate::{
    errors::ReconcileError,
    projector::{grouped_result, matched_result, unmatched_result},
    tree::{AssertionTree, DataNode, SourceTree, TreeNode},
};
use blockmatch_metadata::{ItBlock, MatchEvent, RunnerAssertion, TestResult};
use itertools::Itertools;
use std::mem;

/// Matches a source tree against an assertion tree, scope by scope.
///
/// Matching starts at the two roots. Within each pair of matched containers the test blocks are
/// matched first, then the `describe` blocks, which are recursed into. A `describe` block that
/// doesn't match exactly one runner scope makes every test inside it unmatched.
pub struct ContextMatcher<'o> {
    options: MatcherOptions,
    observer: &'o mut dyn MatchObserver,
}

impl<'o> ContextMatcher<'o> {
    /// Creates a new matcher. Diagnostic messages are sent to `observer`.
    pub fn new(options: MatcherOptions, observer: &'o mut dyn MatchObserver) -> Self {
        Self { options, observer }
    }

    /// Matches the trees, returning one result per test block in the source tree.
    ///
    /// Both trees record the match history on their nodes. Results are in tree order: within a
    /// scope, test blocks come before the contents of nested `describe` blocks.
    pub fn match_trees(
        &mut self,
        source: &mut SourceTree,
        assertions: &mut AssertionTree,
    ) -> Result<Vec<TestResult>, ReconcileError> {
        let mut results = Vec::with_capacity(source.data_count());
        self.match_containers(source, assertions, &mut results)?;
        Ok(results)
    }

    fn match_containers(
        &mut self,
        source: &mut SourceTree,
        assertions: &mut AssertionTree,
        results: &mut Vec<TestResult>,
    ) -> Result<(), ReconcileError> {
        self.report_shared_lines(source.child_data());

        // Test blocks.
        let mut slots: Vec<_> = mem::take(assertions.child_data_mut())
            .into_iter()
            .map(Some)
            .collect();
        let list = match_list(source.child_data_mut(), &mut slots, self.data_phases());
        let handled: Result<Vec<_>, _> = source
            .child_data()
            .iter()
            .zip(&list.outcomes)
            .map(|(block, outcome)| self.handle_test_block_match(block, &slots, outcome))
            .collect();
        self.report_unclaimed(NodeLabel::Test, &slots, &list.unclaimed);
        *assertions.child_data_mut() = slots.into_iter().flatten().collect();
        results.extend(handled?);

        // Describe blocks.
        let mut slots: Vec<_> = mem::take(assertions.child_containers_mut())
            .into_iter()
            .map(Some)
            .collect();
        let list = match_list(
            source.child_containers_mut(),
            &mut slots,
            self.container_phases(),
        );
        let mut handled = Ok(());
        for (block, outcome) in source.child_containers_mut().iter_mut().zip(&list.outcomes) {
            handled = self.handle_describe_block_match(block, &mut slots, outcome, results);
            if handled.is_err() {
                break;
            }
        }
        self.report_unclaimed(NodeLabel::Describe, &slots, &list.unclaimed);
        *assertions.child_containers_mut() = slots.into_iter().flatten().collect();
        handled
    }

    /// Resolves one test block against its match outcome.
    fn handle_test_block_match(
        &mut self,
        block: &DataNode<ItBlock>,
        slots: &[Option<DataNode<RunnerAssertion>>],
        outcome: &ListOutcome,
    ) -> Result<TestResult, ReconcileError> {
        let (slot, event) = match outcome {
            ListOutcome::Matched { slot, event } => (*slot, *event),
            ListOutcome::Unmatched {
                candidates,
                event,
                reason,
            } => {
                self.report_unmatched(NodeLabel::Test, block, *candidates, *event, reason);
                return Ok(unmatched_result(block, reason.to_string()));
            }
        };

        let Some(assertion) = slots.get(slot).and_then(Option::as_ref) else {
            return Err(ReconcileError::EmptyAssertionGroup {
                test_name: block.full_name().to_owned(),
            });
        };
        self.observer.observe(&MatchMessage::Matched {
            label: NodeLabel::Test,
            source: block.full_name(),
            assertion: assertion.full_name(),
            event,
        });

        let members: Vec<_> = assertion.all().collect();
        match members.as_slice() {
            [] => Err(ReconcileError::EmptyAssertionGroup {
                test_name: block.full_name().to_owned(),
            }),
            [single] => {
                self.check_unusual_match(block, single);
                Ok(matched_result(block, single))
            }
            members => {
                let primary = members
                    .iter()
                    .position_min_by_key(|member| member.data().status.primary_rank())
                    .unwrap_or_default();
                let rest = members
                    .iter()
                    .enumerate()
                    .filter(|&(index, _)| index != primary)
                    .map(|(_, member)| *member)
                    .sorted_by_key(|member| member.data().status.primary_rank());
                Ok(grouped_result(block, members[primary], rest))
            }
        }
    }

    /// Resolves one `describe` block against its match outcome, recursing into matched pairs.
    fn handle_describe_block_match(
        &mut self,
        block: &mut SourceTree,
        slots: &mut [Option<AssertionTree>],
        outcome: &ListOutcome,
        results: &mut Vec<TestResult>,
    ) -> Result<(), ReconcileError> {
        match outcome {
            ListOutcome::Matched { slot, event } => {
                match slots.get_mut(*slot).and_then(Option::as_mut) {
                    Some(scope) => {
                        self.observer.observe(&MatchMessage::Matched {
                            label: NodeLabel::Describe,
                            source: block.full_name(),
                            assertion: scope.full_name(),
                            event: *event,
                        });
                        self.match_containers(block, scope, results)
                    }
                    None => {
                        fail_subtree(block, UnmatchedReason::NoCandidates, results);
                        Ok(())
                    }
                }
            }
            ListOutcome::Unmatched {
                candidates,
                event,
                reason,
            } => {
                self.report_unmatched(NodeLabel::Describe, &*block, *candidates, *event, reason);
                fail_subtree(block, reason.clone(), results);
                Ok(())
            }
        }
    }

    fn check_unusual_match(
        &mut self,
        block: &DataNode<ItBlock>,
        assertion: &DataNode<RunnerAssertion>,
    ) {
        let name_agrees =
            block.full_name() == assertion.full_name() || block.name() == assertion.name();
        let position_agrees = block.zero_based_line().is_some()
            && block.zero_based_line() == assertion.zero_based_line();
        if !name_agrees && !position_agrees {
            self.observer.observe(&MatchMessage::UnusualMatch {
                source: block.full_name(),
                assertion: assertion.full_name(),
                source_line: block.zero_based_line(),
                assertion_line: assertion.zero_based_line(),
            });
        }
    }

    fn report_unmatched<N: TreeNode>(
        &mut self,
        label: NodeLabel,
        node: &N,
        candidates: usize,
        event: MatchEvent,
        reason: &UnmatchedReason,
    ) {
        if let UnmatchedReason::DuplicateName(count) = reason {
            self.observer.observe(&MatchMessage::DuplicateName {
                label,
                source: node.full_name(),
                count: *count,
            });
        }
        self.observer.observe(&MatchMessage::Unmatched {
            label,
            source: node.full_name(),
            candidates,
            event,
        });
    }

    fn report_unclaimed<A: TreeNode>(
        &mut self,
        label: NodeLabel,
        slots: &[Option<A>],
        unclaimed: &[usize],
    ) {
        if !self.options.report_unmatched_assertions {
            return;
        }
        for assertion in unclaimed.iter().filter_map(|&slot| slots[slot].as_ref()) {
            self.observer.observe(&MatchMessage::UnmatchedAssertion {
                label,
                assertion: assertion.full_name(),
                line: assertion.zero_based_line(),
            });
        }
    }

    fn report_shared_lines(&mut self, tests: &[DataNode<ItBlock>]) {
        // Siblings are sorted by line, so blocks sharing a line are adjacent.
        for (first, second) in tests.iter().tuple_windows() {
            if let (Some(line), Some(other)) = (first.zero_based_line(), second.zero_based_line())
            {
                if line == other {
                    self.observer.observe(&MatchMessage::SharedSourceLine {
                        first: first.full_name(),
                        second: second.full_name(),
                        line,
                    });
                }
            }
        }
    }

    fn data_phases(&self) -> ListPhases {
        ListPhases {
            sequence: self.options.sequence,
            location: self.options.location_fallback,
            local_name: self.options.local_name_fallback,
            located: true,
            ignore_group_diff: false,
        }
    }

    fn container_phases(&self) -> ListPhases {
        // Runner scopes carry no location, so containers are matched by sequence and name only.
        ListPhases {
            sequence: self.options.sequence,
            location: false,
            local_name: self.options.local_name_fallback,
            located: false,
            ignore_group_diff: true,
        }
    }
}

/// Marks every node below `block` as failed, and emits an unmatched result for each test.
fn fail_subtree(block: &mut SourceTree, reason: UnmatchedReason, results: &mut Vec<TestResult>) {
    let message = format!("describe block `{}`: {reason}", block.full_name());
    block.for_each_container_mut(&mut |container| container.add_event(MatchEvent::MatchFailed));
    block.for_each_data_mut(&mut |test| {
        test.add_event(MatchEvent::MatchFailed);
        results.push(unmatched_result(test, message.as_str()));
    });
}
