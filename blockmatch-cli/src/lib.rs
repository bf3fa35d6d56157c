// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconcile parsed test blocks with the results a test runner reported.
//!
//! `blockmatch reconcile` reads a source tree produced by a parser and an assertion list produced
//! by a test runner, and prints one result per test block.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter};
