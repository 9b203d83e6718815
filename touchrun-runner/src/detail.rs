// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A detailed view of a single outcome.

use crate::{
    outcome::{ResultState, TestOutcome},
    projector::{Color, Palette},
};
use swrite::{SWrite, swrite};

/// Shown in place of any empty field.
pub const NONE_PLACEHOLDER: &str = "<none>";

/// Display fields for a single outcome, as shown when a test is selected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultDetail {
    /// The full name of the test.
    pub full_name: String,

    /// The overall state of the outcome.
    pub state: ResultState,

    /// The color of the overall state.
    pub color: Color,

    /// The outcome's message, or [`NONE_PLACEHOLDER`].
    pub message: String,

    /// Captured output, or [`NONE_PLACEHOLDER`].
    pub output: String,

    /// The stack trace, or [`NONE_PLACEHOLDER`].
    pub stack_trace: String,

    /// One `key = value` line per property value, or [`NONE_PLACEHOLDER`].
    pub properties: String,
}

impl ResultDetail {
    /// Builds the detail view for an outcome.
    pub fn new(outcome: &TestOutcome, palette: &Palette) -> Self {
        let mut properties = String::new();
        for (key, values) in outcome.test().properties() {
            for value in values {
                swrite!(properties, "{key} = {value}\n");
            }
        }

        let state = outcome.overall_state();
        Self {
            full_name: outcome.test().full_name().to_owned(),
            state,
            color: palette.color_for(state.status),
            message: string_or_none(outcome.message()),
            output: string_or_none(outcome.output()),
            stack_trace: string_or_none(outcome.stack_trace()),
            properties: string_or_none(Some(&properties)),
        }
    }
}

fn string_or_none(s: Option<&str>) -> String {
    match s {
        Some(s) if !s.trim().is_empty() => s.to_owned(),
        _ => NONE_PLACEHOLDER.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_tree::TestNode;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_fields_show_placeholder() {
        let node = TestNode::case("adds").build();
        let outcome = TestOutcome::builder(node, ResultState::SUCCESS)
            .output("   \n")
            .build();
        let detail = ResultDetail::new(&outcome, &Palette::default());
        assert_eq!(
            detail,
            ResultDetail {
                full_name: "adds".to_owned(),
                state: ResultState::SUCCESS,
                color: Palette::DEFAULT_PASSED,
                message: "<none>".to_owned(),
                output: "<none>".to_owned(),
                stack_trace: "<none>".to_owned(),
                properties: "<none>".to_owned(),
            }
        );
    }

    #[test]
    fn properties_list_every_value() {
        let node = TestNode::suite("root")
            .child(
                TestNode::suite("Math").child(
                    TestNode::case("divides")
                        .property("Category", "fast")
                        .property("Author", "ana")
                        .property("Category", "unit"),
                ),
            )
            .build();
        let divides = node.children()[0].children()[0].clone();
        let outcome = TestOutcome::builder(divides, ResultState::ERROR)
            .message("division by zero")
            .stack_trace("at Math.divides()")
            .build();

        let detail = ResultDetail::new(&outcome, &Palette::default());
        assert_eq!(detail.full_name, "Math.divides");
        assert_eq!(detail.color, Palette::DEFAULT_FAILED);
        assert_eq!(detail.message, "division by zero");
        assert_eq!(detail.stack_trace, "at Math.divides()");
        assert_eq!(
            detail.properties,
            indoc! {"
                Category = fast
                Category = unit
                Author = ana
            "}
        );
    }
}
