// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Results of executing tests.
//!
//! A [`TestOutcome`] is produced by an engine for every executed node, and mirrors the shape of
//! the [`TestNode`] tree. Outcomes are immutable: a re-run produces a fresh tree, which replaces
//! the old one wholesale.
//!
//! # Overall state
//!
//! A suite's own recorded state says nothing about its children: a suite whose setup succeeded
//! reports `Passed` even if one of its cases failed. The *overall* state is the worst state across
//! the outcome and all of its descendants, ordered by [`TestStatus`] severity. It is computed once,
//! bottom-up, when the outcome is built.

use crate::test_tree::{DepthFirst, TestNode};
use std::{
    fmt,
    ops::{Add, AddAssign},
    sync::Arc,
    time::Duration,
};
use touchrun_metadata::{RecordedLabel, RecordedStatus};

/// The status of a test result.
///
/// Variants are declared in increasing order of severity, so the derived [`Ord`] implementation
/// orders them `Passed < Skipped < Inconclusive < Warning < Failed`.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum TestStatus {
    /// The test passed.
    Passed,

    /// The test was not executed.
    Skipped,

    /// The test could not determine a result.
    Inconclusive,

    /// The test passed with warnings.
    Warning,

    /// The test failed.
    Failed,
}

impl TestStatus {
    /// All statuses, in increasing order of severity.
    pub const ALL: [TestStatus; 5] = [
        TestStatus::Passed,
        TestStatus::Skipped,
        TestStatus::Inconclusive,
        TestStatus::Warning,
        TestStatus::Failed,
    ];

    /// Returns the display name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "Passed",
            TestStatus::Skipped => "Skipped",
            TestStatus::Inconclusive => "Inconclusive",
            TestStatus::Warning => "Warning",
            TestStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecordedStatus> for TestStatus {
    fn from(status: RecordedStatus) -> Self {
        match status {
            RecordedStatus::Passed => TestStatus::Passed,
            RecordedStatus::Failed => TestStatus::Failed,
            RecordedStatus::Warning => TestStatus::Warning,
            RecordedStatus::Skipped => TestStatus::Skipped,
            RecordedStatus::Inconclusive => TestStatus::Inconclusive,
        }
    }
}

/// A refinement of a [`TestStatus`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResultLabel {
    /// No refinement.
    None,
    /// The test failed with an unexpected error.
    Error,
    /// The test was cancelled.
    Cancelled,
    /// The test is invalid.
    Invalid,
    /// The test was ignored.
    Ignored,
    /// The test is explicit and wasn't selected.
    Explicit,
    /// A descendant failed.
    ChildFailure,
    /// A descendant produced a warning.
    ChildWarning,
    /// A descendant was skipped.
    ChildIgnored,
}

impl ResultLabel {
    /// Returns the display text for this label, or `None` for [`ResultLabel::None`].
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            ResultLabel::None => None,
            ResultLabel::Error => Some("Error"),
            ResultLabel::Cancelled => Some("Cancelled"),
            ResultLabel::Invalid => Some("Invalid"),
            ResultLabel::Ignored => Some("Ignored"),
            ResultLabel::Explicit => Some("Explicit"),
            ResultLabel::ChildFailure => Some("Child failure"),
            ResultLabel::ChildWarning => Some("Child warning"),
            ResultLabel::ChildIgnored => Some("Child ignored"),
        }
    }
}

impl From<RecordedLabel> for ResultLabel {
    fn from(label: RecordedLabel) -> Self {
        match label {
            RecordedLabel::None => ResultLabel::None,
            RecordedLabel::Error => ResultLabel::Error,
            RecordedLabel::Cancelled => ResultLabel::Cancelled,
            RecordedLabel::Invalid => ResultLabel::Invalid,
            RecordedLabel::Ignored => ResultLabel::Ignored,
            RecordedLabel::Explicit => ResultLabel::Explicit,
        }
    }
}

/// The state a test result ended in: a status, plus an optional label.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ResultState {
    /// The status.
    pub status: TestStatus,

    /// The label refining the status.
    pub label: ResultLabel,
}

impl ResultState {
    /// The test passed.
    pub const SUCCESS: Self = Self::new(TestStatus::Passed, ResultLabel::None);
    /// The test failed an assertion.
    pub const FAILURE: Self = Self::new(TestStatus::Failed, ResultLabel::None);
    /// The test failed with an unexpected error.
    pub const ERROR: Self = Self::new(TestStatus::Failed, ResultLabel::Error);
    /// The test was cancelled while running.
    pub const CANCELLED: Self = Self::new(TestStatus::Failed, ResultLabel::Cancelled);
    /// The test is invalid and couldn't be run.
    pub const NOT_RUNNABLE: Self = Self::new(TestStatus::Failed, ResultLabel::Invalid);
    /// A descendant failed.
    pub const CHILD_FAILURE: Self = Self::new(TestStatus::Failed, ResultLabel::ChildFailure);
    /// The test produced a warning.
    pub const WARNING: Self = Self::new(TestStatus::Warning, ResultLabel::None);
    /// A descendant produced a warning.
    pub const CHILD_WARNING: Self = Self::new(TestStatus::Warning, ResultLabel::ChildWarning);
    /// The test was skipped.
    pub const SKIPPED: Self = Self::new(TestStatus::Skipped, ResultLabel::None);
    /// The test was ignored.
    pub const IGNORED: Self = Self::new(TestStatus::Skipped, ResultLabel::Ignored);
    /// The test is explicit and wasn't selected.
    pub const EXPLICIT: Self = Self::new(TestStatus::Skipped, ResultLabel::Explicit);
    /// A descendant was skipped.
    pub const CHILD_IGNORED: Self = Self::new(TestStatus::Skipped, ResultLabel::ChildIgnored);
    /// The test could not determine a result.
    pub const INCONCLUSIVE: Self = Self::new(TestStatus::Inconclusive, ResultLabel::None);

    /// Creates a new result state.
    pub const fn new(status: TestStatus, label: ResultLabel) -> Self {
        Self { status, label }
    }

    /// The state a suite takes on when a descendant with the given status is the worst in its
    /// subtree.
    fn from_child(status: TestStatus) -> Self {
        match status {
            TestStatus::Passed => Self::SUCCESS,
            TestStatus::Skipped => Self::CHILD_IGNORED,
            TestStatus::Inconclusive => Self::INCONCLUSIVE,
            TestStatus::Warning => Self::CHILD_WARNING,
            TestStatus::Failed => Self::CHILD_FAILURE,
        }
    }
}

impl fmt::Display for ResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label.as_str() {
            Some(label) => write!(f, "{}:{label}", self.status),
            None => write!(f, "{}", self.status),
        }
    }
}

/// Leaf counts by status.
///
/// For a leaf outcome, exactly one bucket is 1. For a composite outcome, every bucket is the sum
/// over its children.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct OutcomeCounts {
    /// Leaves that passed.
    pub passed: usize,
    /// Leaves that failed.
    pub failed: usize,
    /// Leaves that produced warnings.
    pub warnings: usize,
    /// Leaves that were inconclusive.
    pub inconclusive: usize,
    /// Leaves that were skipped.
    pub skipped: usize,
}

impl OutcomeCounts {
    fn for_leaf(status: TestStatus) -> Self {
        let mut counts = Self::default();
        *counts.bucket_mut(status) = 1;
        counts
    }

    fn bucket_mut(&mut self, status: TestStatus) -> &mut usize {
        match status {
            TestStatus::Passed => &mut self.passed,
            TestStatus::Skipped => &mut self.skipped,
            TestStatus::Inconclusive => &mut self.inconclusive,
            TestStatus::Warning => &mut self.warnings,
            TestStatus::Failed => &mut self.failed,
        }
    }

    /// Returns the count for the given status.
    pub fn get(&self, status: TestStatus) -> usize {
        match status {
            TestStatus::Passed => self.passed,
            TestStatus::Skipped => self.skipped,
            TestStatus::Inconclusive => self.inconclusive,
            TestStatus::Warning => self.warnings,
            TestStatus::Failed => self.failed,
        }
    }

    /// The total number of leaves counted.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.warnings + self.inconclusive + self.skipped
    }
}

impl Add for OutcomeCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for OutcomeCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.passed += rhs.passed;
        self.failed += rhs.failed;
        self.warnings += rhs.warnings;
        self.inconclusive += rhs.inconclusive;
        self.skipped += rhs.skipped;
    }
}

/// The result of executing a [`TestNode`].
#[derive(Debug)]
pub struct TestOutcome {
    test: Arc<TestNode>,
    state: ResultState,
    overall: ResultState,
    message: Option<String>,
    output: Option<String>,
    stack_trace: Option<String>,
    duration: Duration,
    assert_count: usize,
    counts: OutcomeCounts,
    children: Vec<Arc<TestOutcome>>,
}

impl TestOutcome {
    /// Starts building an outcome for `test` with its own recorded `state`.
    pub fn builder(test: Arc<TestNode>, state: ResultState) -> TestOutcomeBuilder {
        TestOutcomeBuilder {
            test,
            state,
            message: None,
            output: None,
            stack_trace: None,
            duration: Duration::ZERO,
            assert_count: 0,
            children: Vec::new(),
        }
    }

    /// The test this is the result of.
    pub fn test(&self) -> &Arc<TestNode> {
        &self.test
    }

    /// The state recorded for this outcome itself, ignoring descendants.
    pub fn state(&self) -> ResultState {
        self.state
    }

    /// The worst state across this outcome and all its descendants.
    ///
    /// For a leaf, this is the same as [`state`](Self::state).
    pub fn overall_state(&self) -> ResultState {
        self.overall
    }

    /// The failure, warning or skip message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Output captured while the test ran.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// The stack trace of a failure.
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Elapsed time.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Elapsed time in whole milliseconds, truncated.
    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }

    /// Assertions evaluated by this test, including all descendants.
    pub fn assert_count(&self) -> usize {
        self.assert_count
    }

    /// Leaf counts by status.
    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    /// The number of leaves that passed.
    pub fn pass_count(&self) -> usize {
        self.counts.passed
    }

    /// The number of leaves that failed.
    pub fn fail_count(&self) -> usize {
        self.counts.failed
    }

    /// The number of leaves that produced warnings.
    pub fn warning_count(&self) -> usize {
        self.counts.warnings
    }

    /// The number of leaves that were inconclusive.
    pub fn inconclusive_count(&self) -> usize {
        self.counts.inconclusive
    }

    /// The number of leaves that were skipped.
    pub fn skip_count(&self) -> usize {
        self.counts.skipped
    }

    /// Child outcomes, in execution order.
    pub fn children(&self) -> &[Arc<TestOutcome>] {
        &self.children
    }

    /// Returns true if this outcome has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterates over this outcome and all descendants in depth-first order.
    pub fn depth_first(self: &Arc<Self>) -> DepthFirst<'_, TestOutcome> {
        DepthFirst::new(self, TestOutcome::children)
    }
}

/// Builder for [`TestOutcome`].
#[derive(Debug)]
#[must_use]
pub struct TestOutcomeBuilder {
    test: Arc<TestNode>,
    state: ResultState,
    message: Option<String>,
    output: Option<String>,
    stack_trace: Option<String>,
    duration: Duration,
    assert_count: usize,
    children: Vec<Arc<TestOutcome>>,
}

impl TestOutcomeBuilder {
    /// Sets the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets captured output.
    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Sets the stack trace.
    pub fn stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Sets the elapsed time.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the number of assertions evaluated by this outcome itself. Assertions from children
    /// are added on top.
    pub fn assert_count(mut self, assert_count: usize) -> Self {
        self.assert_count = assert_count;
        self
    }

    /// Appends a child outcome.
    pub fn child(mut self, child: Arc<TestOutcome>) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child outcomes.
    pub fn children(mut self, children: impl IntoIterator<Item = Arc<TestOutcome>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Builds the outcome, computing counts and the overall state from the children.
    pub fn build(self) -> Arc<TestOutcome> {
        let (counts, overall, assert_count) = if self.children.is_empty() {
            // A suite that ran nothing contributes no leaves.
            let counts = if self.test.is_suite() {
                OutcomeCounts::default()
            } else {
                OutcomeCounts::for_leaf(self.state.status)
            };
            (counts, self.state, self.assert_count)
        } else {
            let counts = self
                .children
                .iter()
                .fold(OutcomeCounts::default(), |acc, child| acc + child.counts);
            let assert_count = self.assert_count
                + self
                    .children
                    .iter()
                    .map(|child| child.assert_count)
                    .sum::<usize>();
            let worst_child = self
                .children
                .iter()
                .map(|child| child.overall.status)
                .max()
                .unwrap_or(TestStatus::Passed);
            let overall = if worst_child > self.state.status {
                ResultState::from_child(worst_child)
            } else {
                self.state
            };
            (counts, overall, assert_count)
        };

        Arc::new(TestOutcome {
            test: self.test,
            state: self.state,
            overall,
            message: self.message,
            output: self.output,
            stack_trace: self.stack_trace,
            duration: self.duration,
            assert_count,
            counts,
            children: self.children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use test_strategy::proptest;

    fn leaf(name: &str, state: ResultState) -> Arc<TestOutcome> {
        TestOutcome::builder(TestNode::case(name).build(), state).build()
    }

    fn suite_of(state: ResultState, children: Vec<Arc<TestOutcome>>) -> Arc<TestOutcome> {
        let node = TestNode::suite("suite")
            .children(children.iter().map(|c| TestNode::case(c.test().name())))
            .build();
        TestOutcome::builder(node, state).children(children).build()
    }

    #[test]
    fn severity_order() {
        let mut sorted = TestStatus::ALL;
        sorted.sort();
        assert_eq!(sorted, TestStatus::ALL);
        assert!(TestStatus::Failed > TestStatus::Warning);
        assert!(TestStatus::Warning > TestStatus::Inconclusive);
        assert!(TestStatus::Inconclusive > TestStatus::Skipped);
        assert!(TestStatus::Skipped > TestStatus::Passed);
    }

    #[test]
    fn leaf_overall_is_own_state() {
        let outcome = leaf("a", ResultState::ERROR);
        assert_eq!(outcome.overall_state(), ResultState::ERROR);
        assert_eq!(outcome.counts().failed, 1);
        assert_eq!(outcome.counts().total(), 1);
    }

    // Regression guard: a suite that reports itself as passed still resolves to failed when a
    // child failed.
    #[test]
    fn self_reported_pass_with_failed_child_is_failed() {
        let outcome = suite_of(
            ResultState::SUCCESS,
            vec![leaf("a", ResultState::SUCCESS), leaf("b", ResultState::FAILURE)],
        );
        assert_eq!(outcome.state(), ResultState::SUCCESS);
        assert_eq!(outcome.overall_state(), ResultState::CHILD_FAILURE);
        assert_eq!(outcome.overall_state().to_string(), "Failed:Child failure");
        assert_eq!(outcome.pass_count(), 1);
        assert_eq!(outcome.fail_count(), 1);
    }

    #[test]
    fn own_state_wins_when_worse() {
        let outcome = suite_of(ResultState::ERROR, vec![leaf("a", ResultState::WARNING)]);
        assert_eq!(outcome.overall_state(), ResultState::ERROR);
    }

    #[test_case(&[TestStatus::Passed, TestStatus::Passed], ResultState::SUCCESS; "all passed")]
    #[test_case(&[TestStatus::Passed, TestStatus::Skipped], ResultState::CHILD_IGNORED; "skipped beats passed")]
    #[test_case(&[TestStatus::Skipped, TestStatus::Inconclusive], ResultState::INCONCLUSIVE; "inconclusive beats skipped")]
    #[test_case(&[TestStatus::Inconclusive, TestStatus::Warning], ResultState::CHILD_WARNING; "warning beats inconclusive")]
    #[test_case(&[TestStatus::Warning, TestStatus::Failed, TestStatus::Passed], ResultState::CHILD_FAILURE; "failed beats everything")]
    fn mixed_children(statuses: &[TestStatus], expected: ResultState) {
        let children = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                leaf(
                    &format!("t{i}"),
                    ResultState::new(*status, ResultLabel::None),
                )
            })
            .collect();
        let outcome = suite_of(ResultState::SUCCESS, children);
        assert_eq!(outcome.overall_state(), expected);
    }

    #[test]
    fn nested_counts_and_asserts() {
        let inner = suite_of(
            ResultState::SUCCESS,
            vec![
                TestOutcome::builder(TestNode::case("x").build(), ResultState::SUCCESS)
                    .assert_count(3)
                    .build(),
                leaf("y", ResultState::IGNORED),
            ],
        );
        let outer = suite_of(
            ResultState::SUCCESS,
            vec![
                inner,
                TestOutcome::builder(TestNode::case("z").build(), ResultState::WARNING)
                    .assert_count(2)
                    .build(),
            ],
        );
        assert_eq!(
            outer.counts(),
            OutcomeCounts {
                passed: 1,
                failed: 0,
                warnings: 1,
                inconclusive: 0,
                skipped: 1,
            }
        );
        assert_eq!(outer.assert_count(), 5);
        assert_eq!(outer.overall_state(), ResultState::CHILD_WARNING);
        assert_eq!(outer.depth_first().count(), 5);
    }

    #[test]
    fn duration_ms_truncates() {
        let outcome = TestOutcome::builder(TestNode::case("a").build(), ResultState::SUCCESS)
            .duration(Duration::from_secs_f64(0.1239))
            .build();
        assert_eq!(outcome.duration_ms(), 123);
    }

    #[test]
    fn result_state_display() {
        assert_eq!(ResultState::SUCCESS.to_string(), "Passed");
        assert_eq!(ResultState::IGNORED.to_string(), "Skipped:Ignored");
        assert_eq!(ResultState::NOT_RUNNABLE.to_string(), "Failed:Invalid");
    }

    fn nest(statuses: &[TestStatus], depth: usize) -> Arc<TestOutcome> {
        let children = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| leaf(&format!("t{i}"), ResultState::new(*status, ResultLabel::None)))
            .collect();
        (0..depth).fold(suite_of(ResultState::SUCCESS, children), |inner, _| {
            suite_of(ResultState::SUCCESS, vec![inner])
        })
    }

    #[proptest]
    fn overall_is_worst_leaf(
        #[strategy(proptest::collection::vec(proptest::prelude::any::<TestStatus>(), 1..8))]
        statuses: Vec<TestStatus>,
        #[strategy(0usize..4)] depth: usize,
    ) {
        let outcome = nest(&statuses, depth);
        let worst = statuses.iter().copied().max().unwrap();
        proptest::prop_assert_eq!(outcome.overall_state().status, worst);
        proptest::prop_assert_eq!(outcome.counts().total(), statuses.len());
        for status in TestStatus::ALL {
            let expected = statuses.iter().filter(|s| **s == status).count();
            proptest::prop_assert_eq!(outcome.counts().get(status), expected);
        }
    }

    #[proptest]
    fn adding_a_failure_keeps_failed(
        #[strategy(proptest::collection::vec(proptest::prelude::any::<TestStatus>(), 0..8))]
        statuses: Vec<TestStatus>,
        #[strategy(0usize..4)] depth: usize,
    ) {
        let mut statuses = statuses;
        statuses.push(TestStatus::Failed);
        let before = nest(&statuses, depth);
        proptest::prop_assert_eq!(before.overall_state().status, TestStatus::Failed);
        statuses.push(TestStatus::Failed);
        let after = nest(&statuses, depth);
        proptest::prop_assert_eq!(after.overall_state().status, TestStatus::Failed);
    }
}
