// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use blockmatch_metadata::{MatchEvent, ParsedFile, RunnerAssertion, TestResult};
use blockmatch_reconciler::{
    matcher::{CollectingObserver, MatcherOptions},
    reconcile::reconcile,
};
use color_eyre::eyre::{Result, WrapErr};

/// The output of one reconciliation.
pub(crate) struct Reconciled {
    pub(crate) results: Vec<TestResult>,
    pub(crate) messages: Vec<String>,
}

pub(crate) fn reconcile_json(source: &str, assertions: &str) -> Result<Reconciled> {
    reconcile_json_with(source, assertions, MatcherOptions::default())
}

pub(crate) fn reconcile_json_with(
    source: &str,
    assertions: &str,
    options: MatcherOptions,
) -> Result<Reconciled> {
    let parsed = ParsedFile::parse_json(source).wrap_err("source fixture is valid")?;
    let assertions =
        RunnerAssertion::parse_list_json(assertions).wrap_err("assertion fixture is valid")?;

    let mut observer = CollectingObserver::default();
    let results = reconcile(&parsed, &assertions, options, &mut observer)?;
    Ok(Reconciled {
        results,
        messages: observer.messages().to_vec(),
    })
}

pub(crate) fn names(results: &[TestResult]) -> Vec<&str> {
    results.iter().map(|result| result.name.as_str()).collect()
}

pub(crate) fn has_event(result: &TestResult, event: MatchEvent) -> bool {
    result.source_history.contains(&event)
}
