// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `blockmatch` failures.
///
/// `blockmatch` invocations may fail for a variety of reasons. This structure documents the exit
/// codes that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ReconcileExitCode {}

impl ReconcileExitCode {
    /// No errors occurred and blockmatch exited normally.
    pub const OK: i32 = 0;

    /// `--fail-on-unmatched` was passed and at least one test block could not be matched to an
    /// assertion.
    pub const UNMATCHED_TESTS: i32 = 4;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up a blockmatch invocation, for example an invalid
    /// config file.
    pub const SETUP_ERROR: i32 = 96;

    /// A source tree or assertion list could not be read or parsed.
    pub const INPUT_PARSE_ERROR: i32 = 97;

    /// Reconciliation was aborted because the trees violated a structural invariant.
    pub const RECONCILE_ERROR: i32 = 98;
}
