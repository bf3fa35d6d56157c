// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use blockmatch_metadata::{
    DescribeBlock, ItBlock, Location, ParsedFile, ParsedNode, RunnerAssertion,
    TestReconciliationState, TestResult,
};
use blockmatch_reconciler::{
    matcher::{MatcherOptions, NoopObserver},
    reconcile::reconcile,
};
use proptest::{collection::vec, prelude::*};
use test_strategy::{proptest, Arbitrary};

// ---
// Inputs are generated from a small model of a test file: scopes of blocks, some of which are
// parameterized, some of which the runner reports, and some of which it loses the location for.
// ---

#[derive(Arbitrary, Debug)]
struct BlockModel {
    #[strategy(0..4usize)]
    name: usize,
    each: bool,
    #[strategy(1..4usize)]
    invocations: usize,
    reported: bool,
    located: bool,
    #[strategy(0..5usize)]
    status: usize,
}

#[derive(Arbitrary, Debug)]
struct FileModel {
    #[strategy(vec(any::<BlockModel>(), 0..5))]
    top_level: Vec<BlockModel>,
    #[strategy(vec(vec(any::<BlockModel>(), 0..5), 0..3))]
    scopes: Vec<Vec<BlockModel>>,
    sequence: bool,
    location_fallback: bool,
}

const STATUSES: [TestReconciliationState; 5] = [
    TestReconciliationState::KnownFail,
    TestReconciliationState::KnownSuccess,
    TestReconciliationState::KnownSkip,
    TestReconciliationState::KnownTodo,
    TestReconciliationState::Unknown,
];

impl FileModel {
    fn build(&self) -> (ParsedFile, Vec<RunnerAssertion>, usize) {
        let mut line = 1;
        let mut assertions = Vec::new();
        let mut blocks = 0;

        let mut root = add_blocks(&self.top_level, &[], &mut line, &mut assertions);
        blocks += root.len();
        for (index, scope) in self.scopes.iter().enumerate() {
            let name = format!("scope {index}");
            let start = line;
            line += 1;
            let children = add_blocks(scope, &[name.clone()], &mut line, &mut assertions);
            blocks += children.len();
            root.push(ParsedNode::Describe(DescribeBlock {
                name,
                start: Location::new(start, 0),
                end: Location::new(line, 0),
                non_literal_name: false,
                children,
            }));
            line += 1;
        }

        (ParsedFile { file: None, root }, assertions, blocks)
    }

    fn options(&self) -> MatcherOptions {
        MatcherOptions {
            sequence: self.sequence,
            location_fallback: self.location_fallback,
            ..MatcherOptions::default()
        }
    }
}

fn add_blocks(
    models: &[BlockModel],
    ancestors: &[String],
    line: &mut u32,
    assertions: &mut Vec<RunnerAssertion>,
) -> Vec<ParsedNode> {
    models
        .iter()
        .map(|model| {
            let start = *line;
            *line += 3;
            let name = format!("block {}", model.name);
            if model.reported {
                let invocations = if model.each { model.invocations } else { 1 };
                for invocation in 0..invocations {
                    let title = if model.each {
                        format!("{name} #{invocation}")
                    } else {
                        name.clone()
                    };
                    assertions.push(RunnerAssertion {
                        title,
                        ancestor_titles: ancestors.to_vec(),
                        full_name: None,
                        status: STATUSES[model.status],
                        location: model.located.then(|| Location::new(start, 0)),
                        line: None,
                        message: None,
                        short_message: None,
                        terse_message: None,
                    });
                }
            }
            ParsedNode::It(ItBlock {
                name,
                start: Location::new(start, 0),
                end: Location::new(start + 2, 0),
                non_literal_name: false,
                last_property: model.each.then(|| ItBlock::EACH_PROPERTY.to_owned()),
            })
        })
        .collect()
}

fn run(model: &FileModel) -> (Vec<TestResult>, usize) {
    let (parsed, assertions, blocks) = model.build();
    let results = reconcile(&parsed, &assertions, model.options(), &mut NoopObserver)
        .expect("generated trees are consistent");
    (results, blocks)
}

#[proptest(cases = 256)]
fn reconcile_is_deterministic(model: FileModel) {
    let (first, _) = run(&model);
    let (second, _) = run(&model);
    prop_assert_eq!(first, second);
}

#[proptest(cases = 256)]
fn every_block_has_one_result(model: FileModel) {
    let (results, blocks) = run(&model);
    prop_assert_eq!(results.len(), blocks);
}

#[proptest(cases = 256)]
fn error_line_is_inside_block(model: FileModel) {
    let (results, _) = run(&model);
    for result in results.iter().flat_map(|result| {
        std::iter::once(result).chain(&result.multi_results)
    }) {
        if let Some(line) = result.line_number_of_error {
            prop_assert!(
                result.start.line <= line && line <= result.end.line,
                "error line {} outside {}..={} for {}",
                line,
                result.start.line,
                result.end.line,
                result.name,
            );
        }
        prop_assert!(result.end.line >= result.start.line);
    }
}

#[proptest(cases = 256)]
fn unmatched_results_are_unknown(model: FileModel) {
    let (results, _) = run(&model);
    for result in results.iter().filter(|result| !result.is_matched()) {
        prop_assert_eq!(result.status, TestReconciliationState::Unknown);
        prop_assert!(result.short_message.is_some());
        prop_assert!(result.multi_results.is_empty());
    }
}
