// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured access to the documents blockmatch exchanges with its collaborators.
//!
//! Inputs are a [`ParsedFile`] produced by a source parser and a list of [`RunnerAssertion`]s
//! produced by a test runner. The output is a list of [`TestResult`]s, one per test block.

mod assertion;
mod errors;
mod exit_codes;
mod result;
mod source;

pub use assertion::*;
pub use errors::*;
pub use exit_codes::*;
pub use result::*;
pub use source::*;
