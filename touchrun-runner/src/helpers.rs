// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for touchrun-runner.

use crate::write_str::WriteStr;
use std::io;

/// Utilities for pluralizing various words based on count.
pub(crate) mod plural {
    /// Returns "test case" if `count` is 1, otherwise "test cases".
    pub(crate) fn test_cases_str(count: usize) -> &'static str {
        if count == 1 { "test case" } else { "test cases" }
    }

    /// Returns "test" if `count` is 1, otherwise "tests".
    pub(crate) fn tests_str(count: usize) -> &'static str {
        if count == 1 { "test" } else { "tests" }
    }
}

/// Writes `text` with every non-empty line prefixed by `indent`.
///
/// Each line of `text` is terminated with a newline, so empty text writes nothing.
pub(crate) fn write_indented(
    writer: &mut dyn WriteStr,
    indent: &str,
    text: &str,
) -> io::Result<()> {
    for line in text.lines() {
        if line.is_empty() {
            writeln!(writer)?;
        } else {
            writeln!(writer, "{indent}{line}")?;
        }
    }
    Ok(())
}
