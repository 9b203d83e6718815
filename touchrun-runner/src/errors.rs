// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by touchrun.
//!
//! The projector and presenters never fail; everything here comes from the edges: loading
//! assemblies, running them, reading configuration and writing reports.

use crate::{outcome::TestStatus, projector::Color};
use camino::Utf8PathBuf;
use config::ConfigError;
use std::{io, time::TryFromFloatSecsError};
use thiserror::Error;

/// An error that occurred while loading a test assembly.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The assembly could not be read.
    #[error("failed to read test assembly `{path}`")]
    Read {
        /// The path to the assembly.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: io::Error,
    },

    /// The assembly could not be parsed.
    #[error("failed to parse test assembly `{path}`")]
    Parse {
        /// The path to the assembly.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },

    /// A test within the assembly is malformed.
    #[error("invalid test `{full_name}` in `{path}`")]
    InvalidTest {
        /// The path to the assembly.
        path: Utf8PathBuf,

        /// The full name of the test.
        full_name: String,

        /// The underlying error.
        #[source]
        err: RecordedTestError,
    },

    /// Two sibling tests in the assembly have the same name.
    #[error("duplicate test `{full_name}` in `{path}`")]
    DuplicateTest {
        /// The path to the assembly.
        path: Utf8PathBuf,

        /// The full name of the second sibling.
        full_name: String,
    },
}

/// An error in a single recorded test.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordedTestError {
    /// The recorded duration is negative, not finite, or too large.
    #[error("invalid duration {secs}s")]
    InvalidDuration {
        /// The recorded value, in seconds.
        secs: f64,

        /// The underlying error.
        #[source]
        err: TryFromFloatSecsError,
    },
}

/// An error that occurred while running tests.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// `run` was called before any assembly was loaded.
    #[error("no test assembly is loaded")]
    NotLoaded,
}

/// An error that occurred while executing a run and reporting on it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecuteError {
    /// The engine failed to run the tests.
    #[error("failed to run tests")]
    Run(#[from] RunError),

    /// Writing the report failed.
    #[error("failed to write report")]
    Write(#[source] io::Error),
}

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse touchrun config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing the config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building or deserializing the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// The palette is invalid.
    #[error("invalid palette")]
    Palette(#[source] PaletteError),
}

/// An invalid [`Palette`](crate::projector::Palette).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum PaletteError {
    /// A status maps to a fully transparent color, which is reserved for tests that haven't run.
    #[error("color for `{status}` is transparent")]
    Transparent {
        /// The status.
        status: TestStatus,
    },

    /// Two statuses map to the same color.
    #[error("`{first}` and `{second}` both map to {color}")]
    Duplicate {
        /// The first status.
        first: TestStatus,

        /// The second status.
        second: TestStatus,

        /// The shared color.
        color: Color,
    },
}

/// An error that occurred while parsing a [`Color`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid color `{input}`: {reason}")]
pub struct ColorParseError {
    input: String,
    reason: &'static str,
}

impl ColorParseError {
    pub(crate) fn new(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }
}
