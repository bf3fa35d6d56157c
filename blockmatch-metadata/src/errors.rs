// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{error, fmt};

/// An error that occurs while parsing one of the JSON documents exchanged with blockmatch.
#[derive(Debug)]
pub struct JsonParseError {
    kind: JsonDocumentKind,
    err: serde_json::Error,
}

impl JsonParseError {
    pub(crate) fn new(kind: JsonDocumentKind, err: serde_json::Error) -> Self {
        Self { kind, err }
    }

    /// Returns the kind of document that failed to parse.
    pub fn kind(&self) -> JsonDocumentKind {
        self.kind
    }
}

impl fmt::Display for JsonParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "parsing {} JSON failed", self.kind)
    }
}

impl error::Error for JsonParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.err)
    }
}

/// The kind of JSON document that was being parsed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JsonDocumentKind {
    /// A parsed source file: [`ParsedFile`](crate::ParsedFile).
    SourceTree,

    /// A list of runner assertions: [`RunnerAssertion`](crate::RunnerAssertion).
    AssertionList,

    /// A list of reconciled results: [`TestResult`](crate::TestResult).
    TestResults,
}

impl fmt::Display for JsonDocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SourceTree => write!(f, "source tree"),
            Self::AssertionList => write!(f, "assertion list"),
            Self::TestResults => write!(f, "test results"),
        }
    }
}
