// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use touchrun_metadata::TouchrunExitCode;
use touchrun_runner::errors::{ConfigParseError, ExecuteError, LoadError};
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are mostly placeholder messages: the expected way to print out errors is
// with the display_to_stderr method, which colorizes errors.

/// An error that touchrun expects might happen, as opposed to a bug.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("test assembly load error")]
    LoadError {
        #[from]
        err: LoadError,
    },
    #[error("execution error")]
    ExecuteError {
        #[from]
        err: ExecuteError,
    },
    #[error("error writing output")]
    WriteError {
        #[source]
        err: std::io::Error,
    },
    #[error("test run failed")]
    TestRunFailed,
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. } => TouchrunExitCode::SETUP_ERROR,
            Self::LoadError { .. } => TouchrunExitCode::LOAD_FAILED,
            Self::ExecuteError {
                err: ExecuteError::Write(_),
            }
            | Self::WriteError { .. } => TouchrunExitCode::WRITE_OUTPUT_ERROR,
            Self::ExecuteError { .. } => TouchrunExitCode::SETUP_ERROR,
            Self::TestRunFailed => TouchrunExitCode::TEST_RUN_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse touchrun config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::LoadError { err } => {
                error!("{err}");
                err.source()
            }
            Self::ExecuteError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteError { err } => {
                error!("error writing output");
                Some(err as &dyn Error)
            }
            Self::TestRunFailed => {
                error!("test run failed");
                None
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use touchrun_runner::errors::RunError;

    #[test]
    fn exit_codes() {
        assert_eq!(
            ExpectedError::TestRunFailed.process_exit_code(),
            TouchrunExitCode::TEST_RUN_FAILED
        );
        assert_eq!(
            ExpectedError::from(ExecuteError::Run(RunError::NotLoaded)).process_exit_code(),
            TouchrunExitCode::SETUP_ERROR
        );
        assert_eq!(
            ExpectedError::from(ExecuteError::Write(io::ErrorKind::BrokenPipe.into()))
                .process_exit_code(),
            TouchrunExitCode::WRITE_OUTPUT_ERROR
        );
    }
}
