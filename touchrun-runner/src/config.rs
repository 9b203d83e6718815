// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for touchrun.
//!
//! Configuration is layered: the [default config](TouchrunConfig::DEFAULT_CONFIG) embedded in the
//! binary comes first, followed by either `.config/touchrun.toml` (if it exists) or a file passed
//! in explicitly.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    projector::Palette,
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Overall configuration for touchrun.
#[derive(Clone, Debug)]
pub struct TouchrunConfig {
    config_file: Option<Utf8PathBuf>,
    palette: Arc<Palette>,
    run: RunConfig,
    report: ReportConfig,
}

impl TouchrunConfig {
    /// The default location of the config within a directory: `.config/touchrun.toml`.
    pub const CONFIG_PATH: &'static str = ".config/touchrun.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the touchrun config.
    ///
    /// If `config_file` is specified, it is read and must exist. Otherwise,
    /// `.config/touchrun.toml` within `dir` is read if it exists.
    pub fn from_sources(
        dir: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = dir.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };
        debug!(%config_file, "reading touchrun config");

        let builder = Self::make_default_config().add_source(source);
        Self::build_and_deserialize(&builder)
            .map(|config| config.with_file(&config_file))
            .map_err(|kind| ConfigParseError::new(&config_file, kind))
    }

    /// Returns the default configuration.
    pub fn default_config() -> Self {
        Self::build_and_deserialize(&Self::make_default_config())
            .expect("default config is always valid")
    }

    /// The file the config was read from, or `None` for the default config.
    ///
    /// The file may not exist if it was looked up implicitly.
    pub fn config_file(&self) -> Option<&Utf8Path> {
        self.config_file.as_deref()
    }

    /// The palette used to color results.
    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Options passed to the engine when loading an assembly.
    pub fn run_options(&self) -> &IndexMap<String, String> {
        &self.run.options
    }

    /// Whether reports list errors, failures and warnings.
    pub fn show_failures(&self) -> bool {
        self.report.show_failures
    }

    /// Whether reports list tests that weren't run.
    pub fn show_not_run(&self) -> bool {
        self.report.show_not_run
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<Self, ConfigParseErrorKind> {
        let config: TouchrunConfigDeserialize = builder
            .build_cloned()
            .and_then(|config| config.try_deserialize())
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;
        config
            .palette
            .validate()
            .map_err(ConfigParseErrorKind::Palette)?;

        Ok(Self {
            config_file: None,
            palette: Arc::new(config.palette),
            run: config.run,
            report: config.report,
        })
    }

    fn with_file(mut self, config_file: &Utf8Path) -> Self {
        self.config_file = Some(config_file.to_owned());
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TouchrunConfigDeserialize {
    palette: Palette,
    #[serde(default)]
    run: RunConfig,
    report: ReportConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RunConfig {
    #[serde(default)]
    options: IndexMap<String, String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReportConfig {
    show_failures: bool,
    show_not_run: bool,
}
