// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `touchrun` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum TouchrunExitCode {}

impl TouchrunExitCode {
    /// No errors occurred and no executed test failed.
    pub const OK: i32 = 0;

    /// An error was encountered while reading configuration or setting up the run.
    pub const SETUP_ERROR: i32 = 96;

    /// The overall status of the run was a failure.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// Loading the test assembly produced an error.
    pub const LOAD_FAILED: i32 = 104;

    /// Writing the report to standard output failed.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
