// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for reconciliation, from JSON inputs to results.

mod fixtures;
mod properties;
mod scenarios;
