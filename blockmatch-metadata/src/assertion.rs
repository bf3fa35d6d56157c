// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{JsonDocumentKind, JsonParseError},
    Location,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The reconciled status of a single test.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum TestReconciliationState {
    /// The test failed.
    KnownFail,

    /// The test passed.
    KnownSuccess,

    /// The test was skipped.
    KnownSkip,

    /// The test is marked as todo.
    KnownTodo,

    /// No status is known for this test.
    Unknown,
}

impl TestReconciliationState {
    /// The rank of this status when picking the representative result for a group of
    /// parameterized assertions. Lower ranks win.
    ///
    /// The order is fail, unknown, skip (and todo), success.
    pub fn primary_rank(self) -> u8 {
        match self {
            Self::KnownFail => 0,
            Self::Unknown => 1,
            Self::KnownSkip | Self::KnownTodo => 2,
            Self::KnownSuccess => 3,
        }
    }
}

impl fmt::Display for TestReconciliationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::KnownFail => f.pad("FAIL"),
            Self::KnownSuccess => f.pad("PASS"),
            Self::KnownSkip => f.pad("SKIP"),
            Self::KnownTodo => f.pad("TODO"),
            Self::Unknown => f.pad("UNKNOWN"),
        }
    }
}

/// A single assertion reported by the test runner after execution.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerAssertion {
    /// The title of the test, as reported at runtime.
    pub title: String,

    /// The titles of the enclosing `describe` blocks, outermost first.
    #[serde(default)]
    pub ancestor_titles: Vec<String>,

    /// The full name of the test, if the runner reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// The status of the test.
    pub status: TestReconciliationState,

    /// Where the test was declared. `None` for tests the runner could not locate, such as
    /// `test.todo`.
    #[serde(default)]
    pub location: Option<Location>,

    /// The 1-based line the failure was reported at, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// The full failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// A short form of the failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_message: Option<String>,

    /// A single-line form of the failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terse_message: Option<String>,
}

impl RunnerAssertion {
    /// Parses a list of assertions from JSON.
    pub fn parse_list_json(json: impl AsRef<str>) -> Result<Vec<Self>, JsonParseError> {
        serde_json::from_str(json.as_ref())
            .map_err(|err| JsonParseError::new(JsonDocumentKind::AssertionList, err))
    }

    /// Returns the 1-based line this assertion reports its error at.
    ///
    /// This is the explicit failure line if present, otherwise the line the test was declared at.
    pub fn error_line(&self) -> Option<u32> {
        self.line.or(self.location.map(|location| location.line))
    }
}
