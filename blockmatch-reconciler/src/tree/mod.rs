// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trees of test blocks and runner assertions.
//!
//! Both sides are represented with the same generic node shapes: a [`ContainerNode`] for
//! `describe` blocks (or runner scopes) and a [`DataNode`] for individual tests. The shared
//! shape is what lets the matcher walk both trees in lock-step.
//!
//! * [`build_source_tree`] builds a [`SourceTree`] from a parsed source file.
//! * [`build_assertion_tree`] builds an [`AssertionTree`] from the runner's results.

mod assertion;
mod container;
mod node;
mod source;

pub use assertion::*;
pub use container::*;
pub use node::*;
pub use source::*;
