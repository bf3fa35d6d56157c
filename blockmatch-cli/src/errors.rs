// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{StderrStyles, NO_HEADING_TARGET};
use blockmatch_metadata::ReconcileExitCode;
use blockmatch_reconciler::errors::{ConfigParseError, InputReadError, ReconcileError};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

/// An error that `blockmatch` knows how to report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("input read error")]
    InputReadError {
        #[from]
        err: InputReadError,
    },
    #[error("reconcile error")]
    ReconcileError {
        #[from]
        err: ReconcileError,
    },
    #[error("failed to serialize results")]
    SerializeResultsError {
        #[source]
        err: serde_json::Error,
    },
    #[error("failed to write results")]
    WriteResultsError {
        #[source]
        err: std::io::Error,
    },
    #[error("{count} test blocks could not be matched")]
    UnmatchedTests { count: usize },
}

impl ExpectedError {
    pub(crate) fn serialize_results(err: serde_json::Error) -> Self {
        Self::SerializeResultsError { err }
    }

    pub(crate) fn write_results(err: std::io::Error) -> Self {
        Self::WriteResultsError { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } => ReconcileExitCode::SETUP_ERROR,
            Self::InputReadError { .. } => ReconcileExitCode::INPUT_PARSE_ERROR,
            Self::ReconcileError { .. } => ReconcileExitCode::RECONCILE_ERROR,
            Self::SerializeResultsError { .. } | Self::WriteResultsError { .. } => {
                ReconcileExitCode::WRITE_OUTPUT_ERROR
            }
            Self::UnmatchedTests { .. } => ReconcileExitCode::UNMATCHED_TESTS,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse blockmatch config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::InputReadError { err } => {
                error!("{err}");
                err.source()
            }
            Self::ReconcileError { err } => {
                error!("{err}");
                err.source()
            }
            Self::SerializeResultsError { err } => {
                error!("failed to serialize results");
                Some(err as &dyn Error)
            }
            Self::WriteResultsError { err } => {
                error!("failed to write results");
                Some(err as &dyn Error)
            }
            Self::UnmatchedTests { count } => {
                error!(
                    "{} {} could not be matched to the runner's assertions",
                    count.style(styles.bold),
                    plural_blocks(*count),
                );
                None
            }
        };

        if next_error.is_some() {
            error!(target: NO_HEADING_TARGET, "\nCaused by:");
        }
        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "  - {err}");
            next_error = err.source();
        }
    }
}

fn plural_blocks(count: usize) -> &'static str {
    if count == 1 {
        "test block"
    } else {
        "test blocks"
    }
}
