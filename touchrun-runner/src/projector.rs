// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Projection of a test and its outcome onto display fields.
//!
//! Everything here is a pure function of a `(TestNode, Option<TestOutcome>)` pair: the projector
//! never fails and never has side effects. An absent outcome means the test hasn't been executed
//! yet.

use crate::{
    errors::{ColorParseError, PaletteError},
    outcome::{TestOutcome, TestStatus},
    test_tree::TestNode,
};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// An RGBA color.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
pub struct Color {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
    /// Alpha component. 0 is fully transparent.
    pub a: u8,
}

impl Color {
    /// The color of a test that hasn't been executed.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xff)
    }

    /// Creates a color with an alpha component.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns true if this color has no opacity at all.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#rrggbb` or `#rrggbbaa`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let hex = input
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::new(input, "expected a leading `#`"))?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(ColorParseError::new(
                input,
                "expected 6 or 8 hexadecimal digits",
            ));
        }

        let component = |index: usize| {
            u8::from_str_radix(&hex[index..index + 2], 16)
                .map_err(|_| ColorParseError::new(input, "invalid hexadecimal digit"))
        };
        let alpha = if hex.len() == 8 { component(6)? } else { 0xff };
        Ok(Self::rgba(component(0)?, component(2)?, component(4)?, alpha))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// A total mapping from [`TestStatus`] to [`Color`].
///
/// Every status must map to a distinct, visible color: [`Color::TRANSPARENT`] is reserved for
/// tests that haven't run. Palettes read from configuration are checked with
/// [`validate`](Self::validate).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Palette {
    passed: Color,
    failed: Color,
    warning: Color,
    skipped: Color,
    inconclusive: Color,
}

impl Palette {
    /// Green.
    pub const DEFAULT_PASSED: Color = Color::rgb(0x2e, 0x7d, 0x32);
    /// Red.
    pub const DEFAULT_FAILED: Color = Color::rgb(0xc6, 0x28, 0x28);
    /// Amber.
    pub const DEFAULT_WARNING: Color = Color::rgb(0xff, 0x8f, 0x00);
    /// Yellow.
    pub const DEFAULT_SKIPPED: Color = Color::rgb(0xfb, 0xc0, 0x2d);
    /// Gray.
    pub const DEFAULT_INCONCLUSIVE: Color = Color::rgb(0x9e, 0x9e, 0x9e);

    /// Creates a new palette, checking that it's valid.
    pub fn new(
        passed: Color,
        failed: Color,
        warning: Color,
        skipped: Color,
        inconclusive: Color,
    ) -> Result<Self, PaletteError> {
        let palette = Self {
            passed,
            failed,
            warning,
            skipped,
            inconclusive,
        };
        palette.validate()?;
        Ok(palette)
    }

    /// Returns the color for the given status.
    pub fn color_for(&self, status: TestStatus) -> Color {
        match status {
            TestStatus::Passed => self.passed,
            TestStatus::Failed => self.failed,
            TestStatus::Warning => self.warning,
            TestStatus::Skipped => self.skipped,
            TestStatus::Inconclusive => self.inconclusive,
        }
    }

    /// Checks that every status maps to a distinct, non-transparent color.
    pub fn validate(&self) -> Result<(), PaletteError> {
        for (index, status) in TestStatus::ALL.iter().enumerate() {
            let color = self.color_for(*status);
            if color.is_transparent() {
                return Err(PaletteError::Transparent { status: *status });
            }
            if let Some(other) = TestStatus::ALL[..index]
                .iter()
                .find(|other| self.color_for(**other) == color)
            {
                return Err(PaletteError::Duplicate {
                    first: *other,
                    second: *status,
                    color,
                });
            }
        }
        Ok(())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            passed: Self::DEFAULT_PASSED,
            failed: Self::DEFAULT_FAILED,
            warning: Self::DEFAULT_WARNING,
            skipped: Self::DEFAULT_SKIPPED,
            inconclusive: Self::DEFAULT_INCONCLUSIVE,
        }
    }
}

/// Display fields derived from a test and its outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayRecord {
    /// The color to show the test in.
    pub color: Color,

    /// A one-line summary of the test's status.
    pub status_line: String,
}

/// Projects a test and its outcome, if any, onto a [`DisplayRecord`].
pub fn project(node: &TestNode, outcome: Option<&TestOutcome>, palette: &Palette) -> DisplayRecord {
    DisplayRecord {
        color: color(outcome, palette),
        status_line: status_line(node, outcome),
    }
}

/// Returns the color for an outcome: transparent if absent, otherwise the palette color of its
/// overall status.
pub fn color(outcome: Option<&TestOutcome>, palette: &Palette) -> Color {
    match outcome {
        Some(outcome) => palette.color_for(outcome.overall_state().status),
        None => Color::TRANSPARENT,
    }
}

/// Returns the one-line status summary for a test and its outcome.
pub fn status_line(node: &TestNode, outcome: Option<&TestOutcome>) -> String {
    let Some(outcome) = outcome else {
        return if node.has_children() {
            format!(
                "{} test case(s), {}",
                node.test_case_count(),
                node.run_state()
            )
        } else {
            format!("Not Executed, {}", node.run_state())
        };
    };

    let passed = outcome.overall_state().status == TestStatus::Passed;
    match (passed, outcome.has_children()) {
        (true, true) => format!(
            "Success! {} ms for {} test(s); {} skipped",
            outcome.duration_ms(),
            outcome.pass_count(),
            outcome.skip_count(),
        ),
        (true, false) => format!(
            "Success! {} ms for {} assertion(s)",
            outcome.duration_ms(),
            outcome.assert_count(),
        ),
        (false, true) => format!(
            "Failure! {} test(s) - {} failed, {} passed",
            outcome.test().test_case_count(),
            outcome.fail_count(),
            outcome.pass_count(),
        ),
        (false, false) => format!("Failure! {}", outcome.message().unwrap_or_default()),
    }
}
