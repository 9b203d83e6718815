// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node in a recorded test tree: a test suite or a single test case.
///
/// The root of the tree is the test assembly itself. A node with children is a suite; a node
/// without children is a test case.
///
/// Each node may carry the result it produced the last time it was executed. Suites may omit their
/// result, in which case one is derived from their children.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RecordedTest {
    /// The name of the test or suite.
    pub name: String,

    /// The static run state of the test, known before execution.
    #[serde(default)]
    pub run_state: RecordedRunState,

    /// Properties attached to the test, as a multimap.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Vec<String>>,

    /// Child tests, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RecordedTest>,

    /// The recorded result, if the test was executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RecordedResult>,
}

impl RecordedTest {
    /// Parses a recorded test tree from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes this tree as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The result recorded for a single [`RecordedTest`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RecordedResult {
    /// The status the test finished with.
    pub status: RecordedStatus,

    /// A refinement of the status, e.g. `error` for a failure caused by an unexpected exception.
    #[serde(default)]
    pub label: RecordedLabel,

    /// The failure or skip message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Output captured while the test ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// The stack trace associated with a failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,

    /// Elapsed time, in seconds.
    #[serde(default)]
    pub duration_secs: f64,

    /// The number of assertions evaluated.
    #[serde(default)]
    pub assert_count: usize,
}

/// The recorded status of a test.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum RecordedStatus {
    /// The test passed.
    Passed,
    /// The test failed.
    Failed,
    /// The test passed with warnings.
    Warning,
    /// The test was not executed.
    Skipped,
    /// The test could not determine a result.
    Inconclusive,
}

/// A refinement of a [`RecordedStatus`].
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum RecordedLabel {
    /// No refinement.
    #[default]
    None,
    /// The test failed with an unexpected error.
    Error,
    /// The test was cancelled.
    Cancelled,
    /// The test could not be run because it is invalid.
    Invalid,
    /// The test was ignored.
    Ignored,
    /// The test is explicit and wasn't selected.
    Explicit,
}

/// The static run state of a recorded test.
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum RecordedRunState {
    /// The test can be run.
    #[default]
    Runnable,
    /// The test is marked as skipped.
    Skipped,
    /// The test is marked as ignored.
    Ignored,
    /// The test only runs when selected explicitly.
    Explicit,
    /// The test is invalid and can't be run.
    NotRunnable,
}
