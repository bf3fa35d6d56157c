// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{JsonDocumentKind, JsonParseError},
    TestReconciliationState,
};
use serde::{Deserialize, Serialize};
use std::{fmt, io};

/// A record of how a node was matched, or why it was not.
///
/// Match events accumulate on tree nodes during reconciliation and are never cleared.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub enum MatchEvent {
    /// Matched by position within an identically-shaped sibling list.
    #[serde(rename = "match-by-context")]
    MatchByContext,

    /// Matched by full name.
    #[serde(rename = "match-by-name")]
    MatchByName,

    /// Matched because the assertion's location lies inside the test block.
    #[serde(rename = "match-by-location")]
    MatchByLocation,

    /// No candidate could be found.
    #[serde(rename = "match-failed")]
    MatchFailed,

    /// More than one candidate was found.
    #[serde(rename = "match-failed:1-to-many")]
    MatchFailedOneToMany,

    /// The name is shared by more than one sibling, so it can't be matched by name.
    #[serde(rename = "duplicate-name")]
    DuplicateName,

    /// The node has no known location.
    #[serde(rename = "invalid-location")]
    InvalidLocation,

    /// The node's full name disagrees with its name, but it has no ancestor titles.
    #[serde(rename = "missing-ancestor-info")]
    MissingAncestorInfo,
}

impl MatchEvent {
    /// Returns the string form of this event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MatchByContext => "match-by-context",
            Self::MatchByName => "match-by-name",
            Self::MatchByLocation => "match-by-location",
            Self::MatchFailed => "match-failed",
            Self::MatchFailedOneToMany => "match-failed:1-to-many",
            Self::DuplicateName => "duplicate-name",
            Self::InvalidLocation => "invalid-location",
            Self::MissingAncestorInfo => "missing-ancestor-info",
        }
    }

    /// Returns true if this event records a successful match.
    pub fn is_match(self) -> bool {
        matches!(
            self,
            Self::MatchByContext | Self::MatchByName | Self::MatchByLocation
        )
    }
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 0-based position, ready for an editor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct ZeroBasedLocation {
    /// The 0-based line.
    pub line: u32,

    /// The column, as reported by the parser.
    pub column: u32,
}

/// Identifies a test the way the runner does.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestIdentifier {
    /// The test's own title.
    pub title: String,

    /// The titles of the enclosing blocks, outermost first.
    pub ancestor_titles: Vec<String>,
}

/// The reconciled result for one test block.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// The display name of the test.
    pub name: String,

    /// The runner-side identity of the test.
    pub identifier: TestIdentifier,

    /// The reconciled status.
    pub status: TestReconciliationState,

    /// The start of the test block.
    pub start: ZeroBasedLocation,

    /// The end of the test block.
    pub end: ZeroBasedLocation,

    /// A short message: the failure summary, or the reason the block could not be matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_message: Option<String>,

    /// A single-line failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terse_message: Option<String>,

    /// The 0-based line to attach the error to. Always within the test block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number_of_error: Option<u32>,

    /// Results for the other invocations of a parameterized block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multi_results: Vec<TestResult>,

    /// Match events recorded on the source side.
    #[serde(default)]
    pub source_history: Vec<MatchEvent>,

    /// Match events recorded on the assertion side.
    #[serde(default)]
    pub assertion_history: Vec<MatchEvent>,
}

impl TestResult {
    /// Parses a list of results from JSON.
    pub fn parse_list_json(json: impl AsRef<str>) -> Result<Vec<Self>, JsonParseError> {
        serde_json::from_str(json.as_ref())
            .map_err(|err| JsonParseError::new(JsonDocumentKind::TestResults, err))
    }

    /// Writes a list of results to `writer` as JSON, prettified if `pretty` is set.
    pub fn write_list_json(
        results: &[Self],
        pretty: bool,
        writer: impl io::Write,
    ) -> serde_json::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, results)
        } else {
            serde_json::to_writer(writer, results)
        }
    }

    /// Returns true if this block was matched to at least one assertion.
    pub fn is_matched(&self) -> bool {
        self.source_history.iter().any(|event| event.is_match())
    }
}
