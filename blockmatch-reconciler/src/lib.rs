// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core reconciliation logic for blockmatch.
//!
//! blockmatch takes the test blocks a parser found in a source file and the assertions a test
//! runner reported after running that file, and works out which assertion belongs to which block.
//! The result is one [`TestResult`](blockmatch_metadata::TestResult) per block, with a status,
//! a 0-based range and an error line that's always inside the block.
//!
//! The basic flow is:
//!
//! 1. Build a [`SourceTree`](tree::SourceTree) and an [`AssertionTree`](tree::AssertionTree).
//! 2. Match them with a [`ContextMatcher`](matcher::ContextMatcher).
//! 3. Project each match into a result (see [`projector`]).
//!
//! [`reconcile::reconcile`] runs all three steps.

pub mod cache;
pub mod config;
pub mod errors;
pub mod input;
pub mod matcher;
pub mod projector;
pub mod reconcile;
pub mod results;
pub mod tree;
