// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading the JSON inputs from disk.

use crate::errors::InputReadError;
use blockmatch_metadata::{ParsedFile, RunnerAssertion};
use camino::Utf8Path;

/// Reads a parsed source tree from a JSON file.
///
/// If the document doesn't name its source file, the path it was read from is recorded instead.
pub fn read_parsed_file(path: &Utf8Path) -> Result<ParsedFile, InputReadError> {
    let contents = fs_err::read_to_string(path).map_err(|err| InputReadError::read(path, err))?;
    let mut parsed =
        ParsedFile::parse_json(contents).map_err(|err| InputReadError::parse(path, err))?;
    if parsed.file.is_none() {
        parsed.file = Some(path.to_owned());
    }
    Ok(parsed)
}

/// Reads the runner's assertion list from a JSON file.
pub fn read_assertions(path: &Utf8Path) -> Result<Vec<RunnerAssertion>, InputReadError> {
    let contents = fs_err::read_to_string(path).map_err(|err| InputReadError::read(path, err))?;
    RunnerAssertion::parse_list_json(contents).map_err(|err| InputReadError::parse(path, err))
}
