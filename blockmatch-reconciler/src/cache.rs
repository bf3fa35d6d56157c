// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caching reconciled results per source file.

use crate::{errors::ReconcileError, reconcile::Reconciler};
use blockmatch_metadata::{ParsedFile, RunnerAssertion, TestResult};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{map::Entry, IndexMap};

/// Reconciled results, one list per source file.
///
/// A file's list is only ever replaced as a whole. Files are kept in the order they were first
/// reconciled.
#[derive(Clone, Debug, Default)]
pub struct TestResultCache {
    results: IndexMap<Utf8PathBuf, Vec<TestResult>>,
}

impl TestResultCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached results for a file.
    pub fn get(&self, path: &Utf8Path) -> Option<&[TestResult]> {
        self.results.get(path).map(Vec::as_slice)
    }

    /// Stores the results for a file, returning the results it replaced.
    pub fn insert(
        &mut self,
        path: impl Into<Utf8PathBuf>,
        results: Vec<TestResult>,
    ) -> Option<Vec<TestResult>> {
        self.results.insert(path.into(), results)
    }

    /// Drops the results for a file, for example because it was edited. Returns true if there
    /// were results to drop.
    pub fn invalidate(&mut self, path: &Utf8Path) -> bool {
        self.results.shift_remove(path).is_some()
    }

    /// Drops every cached result, for example because the tests were run again.
    pub fn invalidate_all(&mut self) {
        self.results.clear();
    }

    /// Returns the cached results for a file, reconciling and storing them if absent.
    ///
    /// On error, nothing is stored.
    pub fn reconcile_file(
        &mut self,
        path: &Utf8Path,
        reconciler: &Reconciler,
        parsed: &ParsedFile,
        assertions: &[RunnerAssertion],
    ) -> Result<&[TestResult], ReconcileError> {
        match self.results.entry(path.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                let results = reconciler.reconcile(parsed, assertions)?;
                Ok(entry.insert(results).as_slice())
            }
        }
    }

    /// Iterates over the cached files and their results.
    pub fn iter(&self) -> impl Iterator<Item = (&Utf8Path, &[TestResult])> {
        self.results
            .iter()
            .map(|(path, results)| (path.as_path(), results.as_slice()))
    }

    /// Returns the number of cached files.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no files are cached.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
