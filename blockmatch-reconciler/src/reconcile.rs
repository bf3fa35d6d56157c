// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciling one source file's test blocks with the runner's assertions.

use crate::{
    config::ReconcileConfig,
    errors::ReconcileError,
    matcher::{ContextMatcher, MatchObserver, MatcherOptions, TracingObserver},
    tree::{build_assertion_tree, build_source_tree},
};
use blockmatch_metadata::{ParsedFile, RunnerAssertion, TestResult};
use tracing::debug;

/// Reconciles a parsed source file with the assertions the runner reported for it.
///
/// Returns one result per `it`/`test` block in the source file, in tree order. Parameterized
/// blocks carry their other invocations in `multi_results`.
///
/// Blocks that can't be matched are returned with an unknown status and the reason as the short
/// message. An error is only returned if the trees are internally inconsistent.
pub fn reconcile(
    parsed: &ParsedFile,
    assertions: &[RunnerAssertion],
    options: MatcherOptions,
    observer: &mut dyn MatchObserver,
) -> Result<Vec<TestResult>, ReconcileError> {
    let mut source = build_source_tree(parsed);
    let mut assertion_tree = build_assertion_tree(assertions);
    debug!(
        "reconciling {} test blocks with {} assertions{}",
        source.data_count(),
        assertions.len(),
        parsed
            .file
            .as_ref()
            .map(|file| format!(" for {file}"))
            .unwrap_or_default(),
    );

    let results =
        ContextMatcher::new(options, observer).match_trees(&mut source, &mut assertion_tree)?;

    debug!(
        "{} of {} test blocks matched",
        results.iter().filter(|result| result.is_matched()).count(),
        results.len(),
    );
    Ok(results)
}

/// Reconciles files with a fixed set of options, logging match decisions through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconciler {
    options: MatcherOptions,
    verbose: bool,
}

impl Reconciler {
    /// Creates a new reconciler.
    pub fn new(options: MatcherOptions, verbose: bool) -> Self {
        Self { options, verbose }
    }

    /// Creates a new reconciler from the config.
    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(config.matcher_options(), config.diagnostics.verbose)
    }

    /// Returns the options used for matching.
    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Reconciles one file. See [`reconcile`].
    pub fn reconcile(
        &self,
        parsed: &ParsedFile,
        assertions: &[RunnerAssertion],
    ) -> Result<Vec<TestResult>, ReconcileError> {
        let mut observer = TracingObserver::new(self.verbose);
        reconcile(parsed, assertions, self.options, &mut observer)
    }
}
