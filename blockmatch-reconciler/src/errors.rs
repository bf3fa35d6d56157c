// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by blockmatch.

use blockmatch_metadata::JsonParseError;
use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::fmt;
use thiserror::Error;

/// A hard failure during reconciliation.
///
/// Mismatches between the source and the runner are never errors: they're reported as results
/// with an unknown status. This type is only produced when the trees themselves violate an
/// invariant.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReconcileError {
    /// A test block was matched to a runner node that holds no assertions.
    #[error("invalid assertion node for test block `{test_name}`: matched node contains 0 assertions")]
    EmptyAssertionGroup {
        /// The full name of the test block.
        test_name: String,
    },
}

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse blockmatch config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// An error that occurred while reading one of the JSON inputs from disk.
#[derive(Debug, Error)]
pub struct InputReadError {
    path: Utf8PathBuf,
    #[source]
    kind: InputReadErrorKind,
}

impl InputReadError {
    pub(crate) fn read(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self {
            path: path.into(),
            kind: InputReadErrorKind::Read(err),
        }
    }

    pub(crate) fn parse(path: impl Into<Utf8PathBuf>, err: JsonParseError) -> Self {
        Self {
            path: path.into(),
            kind: InputReadErrorKind::Parse(err),
        }
    }

    /// Returns the path that failed to be read.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &InputReadErrorKind {
        &self.kind
    }
}

impl fmt::Display for InputReadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            InputReadErrorKind::Read(_) => write!(f, "failed to read input `{}`", self.path),
            InputReadErrorKind::Parse(_) => write!(f, "failed to parse input `{}`", self.path),
        }
    }
}

/// The kind of error that occurred while reading an input.
#[derive(Debug, Error)]
pub enum InputReadErrorKind {
    /// The file could not be read.
    #[error(transparent)]
    Read(std::io::Error),

    /// The file could not be parsed as the expected document.
    #[error(transparent)]
    Parse(JsonParseError),
}
