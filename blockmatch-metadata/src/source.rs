// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{JsonDocumentKind, JsonParseError};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// A position within a source file, as reported by the parser or the test runner.
///
/// Lines are 1-based. Columns are passed through as reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
pub struct Location {
    /// The 1-based line number.
    pub line: u32,

    /// The column, as reported by the producer.
    #[serde(default)]
    pub column: u32,
}

impl Location {
    /// Creates a new location.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A parsed source file: the top-level blocks found by the parser.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    /// The path to the file, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,

    /// The top-level blocks in the file.
    #[serde(default)]
    pub root: Vec<ParsedNode>,
}

impl ParsedFile {
    /// Parses a source tree from JSON.
    pub fn parse_json(json: impl AsRef<str>) -> Result<Self, JsonParseError> {
        serde_json::from_str(json.as_ref())
            .map_err(|err| JsonParseError::new(JsonDocumentKind::SourceTree, err))
    }
}

/// A single block produced by the source parser.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ParsedNode {
    /// A `describe` block, which may contain other blocks.
    Describe(DescribeBlock),

    /// An `it` or `test` block.
    #[serde(alias = "test")]
    It(ItBlock),
}

impl ParsedNode {
    /// Returns the name of this block.
    pub fn name(&self) -> &str {
        match self {
            Self::Describe(block) => &block.name,
            Self::It(block) => &block.name,
        }
    }
}

/// A `describe` block.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeBlock {
    /// The name of the block. May be synthesized for template-literal names.
    pub name: String,

    /// The start of the block.
    pub start: Location,

    /// The end of the block.
    pub end: Location,

    /// True if the name was not a string literal in source.
    #[serde(default)]
    pub non_literal_name: bool,

    /// Blocks nested inside this one.
    #[serde(default)]
    pub children: Vec<ParsedNode>,
}

/// An `it` or `test` block.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItBlock {
    /// The name of the block. May be synthesized for template-literal names.
    pub name: String,

    /// The start of the block.
    pub start: Location,

    /// The end of the block.
    pub end: Location,

    /// True if the name was not a string literal in source.
    #[serde(default)]
    pub non_literal_name: bool,

    /// The last property accessed on the call, for example `each` in `it.each(...)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_property: Option<String>,
}

impl ItBlock {
    /// The property marking a parameterized block.
    pub const EACH_PROPERTY: &'static str = "each";

    /// Returns true if this block is parameterized with `.each`, so it may produce several
    /// assertions at runtime.
    pub fn is_each(&self) -> bool {
        self.last_property.as_deref() == Some(Self::EACH_PROPERTY)
    }
}
