// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable formats shared between touchrun and its engines.
//!
//! This crate contains:
//!
//! * the recorded test tree format, a JSON document describing a test assembly together with the
//!   result each test produced the last time it was executed ([`RecordedTest`])
//! * documented exit codes for the `touchrun` binary ([`TouchrunExitCode`])

mod exit_codes;
mod recorded;

pub use exit_codes::*;
pub use recorded::*;
