// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for blockmatch.
//!
//! Configuration is read from a built-in default config, with an optional repository-specific
//! file layered on top of it.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    matcher::MatcherOptions,
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Overall configuration for blockmatch.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReconcileConfig {
    /// How test blocks are matched to runner assertions.
    pub matching: MatchingConfig,

    /// How match decisions are reported.
    pub diagnostics: DiagnosticsConfig,
}

/// The `[matching]` section.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct MatchingConfig {
    /// Pair siblings by position when both sides report the same number of them.
    pub sequence: bool,

    /// Fall back to matching by reported location.
    pub location_fallback: bool,

    /// Accept local name matches when ancestor titles are missing.
    pub local_name_fallback: bool,
}

/// The `[diagnostics]` section.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DiagnosticsConfig {
    /// Report match decisions at info level.
    pub verbose: bool,

    /// Report runner assertions that no test block claimed.
    pub report_unmatched_assertions: bool,
}

impl ReconcileConfig {
    /// The default location of the config within a root directory.
    pub const CONFIG_PATH: &'static str = ".config/blockmatch.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or if not specified from `.config/blockmatch.toml`
    /// in `root`.
    ///
    /// If the file isn't specified and `root` doesn't contain a config, the default config is
    /// used.
    pub fn from_sources(
        root: &Utf8Path,
        file: Option<&Utf8Path>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(&config_file, root, &unknown);
        }

        Ok(config)
    }

    /// Parses a config from a TOML string, layered on top of the default config.
    pub fn from_toml_str(
        contents: &str,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigParseError> {
        let builder =
            Self::make_default_config().add_source(File::from_str(contents, FileFormat::Toml));
        let (config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new("<inline>", kind))?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(Utf8Path::new("<inline>"), Utf8Path::new(""), &unknown);
        }

        Ok(config)
    }

    /// Returns the options to pass to the matcher.
    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            sequence: self.matching.sequence,
            location_fallback: self.matching.location_fallback,
            local_name_fallback: self.matching.local_name_fallback,
            report_unmatched_assertions: self.diagnostics.report_unmatched_assertions,
        }
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(Self, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: Self = serde_path_to_error::deserialize(ignored_de).map_err(|error| {
            // The config crate also reports the key: drop it so it isn't printed twice.
            let path = error.path().clone();
            let error = match error.into_inner() {
                ConfigError::At { error, .. } => *error,
                other => other,
            };
            ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                path, error,
            )))
        })?;

        Ok((config, ignored))
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            matching: MatchingConfig {
                sequence: true,
                location_fallback: true,
                local_name_fallback: true,
            },
            diagnostics: DiagnosticsConfig {
                verbose: false,
                report_unmatched_assertions: true,
            },
        }
    }
}

/// Trait for handling configuration warnings.
pub trait ConfigWarnings {
    /// Handle unknown configuration keys found in a config file.
    fn unknown_config_keys(
        &mut self,
        config_file: &Utf8Path,
        root: &Utf8Path,
        unknown: &BTreeSet<String>,
    );
}

/// Default implementation of [`ConfigWarnings`] that logs warnings using the tracing crate.
pub struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(
        &mut self,
        config_file: &Utf8Path,
        root: &Utf8Path,
        unknown: &BTreeSet<String>,
    ) {
        let mut unknown_str = String::new();
        if let [key] = unknown.iter().collect::<Vec<_>>().as_slice() {
            // Print this on the same line.
            unknown_str.push_str("key: ");
            unknown_str.push_str(key);
        } else {
            unknown_str.push_str("keys:\n");
            for ignored_key in unknown {
                unknown_str.push('\n');
                unknown_str.push_str("  - ");
                unknown_str.push_str(ignored_key);
            }
        }

        warn!(
            "in config file {}, ignoring unknown configuration {unknown_str}",
            config_file.strip_prefix(root).unwrap_or(config_file),
        )
    }
}

/// Collects warnings instead of logging them.
#[derive(Debug, Default)]
pub struct CollectedConfigWarnings {
    /// Unknown keys, per config file.
    pub unknown_keys: Vec<(Utf8PathBuf, BTreeSet<String>)>,
}

impl ConfigWarnings for CollectedConfigWarnings {
    fn unknown_config_keys(
        &mut self,
        config_file: &Utf8Path,
        _root: &Utf8Path,
        unknown: &BTreeSet<String>,
    ) {
        self.unknown_keys
            .push((config_file.to_owned(), unknown.clone()));
    }
}
