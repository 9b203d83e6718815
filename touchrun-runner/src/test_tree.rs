// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test definitions, independent of any execution.
//!
//! A loaded test assembly is a tree of [`TestNode`]s. The root is the assembly itself; suites are
//! interior nodes and test cases are leaves. Nodes are built once through [`TestNodeBuilder`] and
//! are immutable afterwards.

use indexmap::IndexMap;
use std::{fmt, sync::Arc};
use touchrun_metadata::RecordedRunState;

/// The static run state of a test, known before execution.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum RunState {
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

impl RunState {
    /// Returns the name of this run state, as shown in status lines.
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Runnable => "Runnable",
            RunState::Skipped => "Skipped",
            RunState::Ignored => "Ignored",
            RunState::Explicit => "Explicit",
            RunState::NotRunnable => "NotRunnable",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecordedRunState> for RunState {
    fn from(state: RecordedRunState) -> Self {
        match state {
            RecordedRunState::Runnable => RunState::Runnable,
            RecordedRunState::Skipped => RunState::Skipped,
            RecordedRunState::Ignored => RunState::Ignored,
            RecordedRunState::Explicit => RunState::Explicit,
            RecordedRunState::NotRunnable => RunState::NotRunnable,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum TestNodeKind {
    Case,
    Suite,
}

/// A test or test suite definition.
#[derive(Debug)]
pub struct TestNode {
    name: String,
    full_name: String,
    path: Vec<String>,
    kind: TestNodeKind,
    run_state: RunState,
    properties: IndexMap<String, Vec<String>>,
    children: Vec<Arc<TestNode>>,
    test_case_count: usize,
}

impl TestNode {
    /// Starts building a single test case.
    pub fn case(name: impl Into<String>) -> TestNodeBuilder {
        TestNodeBuilder::new(name.into(), TestNodeKind::Case)
    }

    /// Starts building a test suite.
    pub fn suite(name: impl Into<String>) -> TestNodeBuilder {
        TestNodeBuilder::new(name.into(), TestNodeKind::Suite)
    }

    /// The short name of this test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dotted name of this test.
    ///
    /// The root of a tree is named by its own name; everything below it is named relative to the
    /// root, so a case `adds` in suite `Math` of assembly `sample` is `Math.adds`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The names of this test and its ancestors, starting from the root.
    ///
    /// Two nodes share a path only if they are siblings with the same name. Full names can
    /// collide in other ways: a suite named like the root, or a case whose name contains a dot.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The static run state of this test.
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Properties attached to this test, as a multimap in declaration order.
    pub fn properties(&self) -> &IndexMap<String, Vec<String>> {
        &self.properties
    }

    /// Child tests, in declaration order.
    pub fn children(&self) -> &[Arc<TestNode>] {
        &self.children
    }

    /// Returns true if this node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns true if this node is a suite, even an empty one.
    pub fn is_suite(&self) -> bool {
        self.kind == TestNodeKind::Suite
    }

    /// The number of test cases at or below this node: 1 for a case, the sum over children for a
    /// suite.
    pub fn test_case_count(&self) -> usize {
        self.test_case_count
    }

    /// Iterates over this node and all its descendants in depth-first order, along with their
    /// depth relative to this node.
    pub fn depth_first(self: &Arc<Self>) -> DepthFirst<'_, TestNode> {
        DepthFirst::new(self, TestNode::children)
    }
}

/// Builder for [`TestNode`] trees.
#[derive(Clone, Debug)]
#[must_use]
pub struct TestNodeBuilder {
    name: String,
    kind: TestNodeKind,
    run_state: RunState,
    properties: IndexMap<String, Vec<String>>,
    children: Vec<TestNodeBuilder>,
}

impl TestNodeBuilder {
    fn new(name: String, kind: TestNodeKind) -> Self {
        Self {
            name,
            kind,
            run_state: RunState::Runnable,
            properties: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Sets the run state.
    pub fn run_state(mut self, run_state: RunState) -> Self {
        self.run_state = run_state;
        self
    }

    /// Adds a property value. Keys may carry several values.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Appends a child. A case that gains a child becomes a suite.
    pub fn child(mut self, child: TestNodeBuilder) -> Self {
        self.kind = TestNodeKind::Suite;
        self.children.push(child);
        self
    }

    /// Appends several children.
    pub fn children(self, children: impl IntoIterator<Item = TestNodeBuilder>) -> Self {
        children.into_iter().fold(self, |this, child| this.child(child))
    }

    /// Builds the tree, treating this node as its root.
    pub fn build(self) -> Arc<TestNode> {
        let full_name = self.name.clone();
        let path = vec![self.name.clone()];
        self.build_impl(full_name, path, true)
    }

    fn build_impl(self, full_name: String, path: Vec<String>, is_root: bool) -> Arc<TestNode> {
        let children: Vec<_> = self
            .children
            .into_iter()
            .map(|child| {
                // Children of the root are named relative to the root.
                let child_full_name = if is_root {
                    child.name.clone()
                } else {
                    format!("{full_name}.{}", child.name)
                };
                let mut child_path = path.clone();
                child_path.push(child.name.clone());
                child.build_impl(child_full_name, child_path, false)
            })
            .collect();

        let test_case_count = match self.kind {
            TestNodeKind::Case => 1,
            TestNodeKind::Suite => children.iter().map(|child| child.test_case_count).sum(),
        };

        Arc::new(TestNode {
            name: self.name,
            full_name,
            path,
            kind: self.kind,
            run_state: self.run_state,
            properties: self.properties,
            children,
            test_case_count,
        })
    }
}

/// Depth-first iterator over a tree of reference-counted nodes.
///
/// Yields `(depth, node)` pairs, with the root at depth 0.
pub struct DepthFirst<'a, T> {
    stack: Vec<(usize, &'a Arc<T>)>,
    children: fn(&T) -> &[Arc<T>],
}

impl<'a, T> DepthFirst<'a, T> {
    pub(crate) fn new(root: &'a Arc<T>, children: fn(&T) -> &[Arc<T>]) -> Self {
        Self {
            stack: vec![(0, root)],
            children,
        }
    }
}

impl<'a, T> Iterator for DepthFirst<'a, T> {
    type Item = (usize, &'a Arc<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        let children: &'a [Arc<T>] = (self.children)(node);
        self.stack
            .extend(children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

impl<T> fmt::Debug for DepthFirst<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthFirst")
            .field("remaining_roots", &self.stack.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Arc<TestNode> {
        TestNode::suite("sample")
            .child(
                TestNode::suite("Math")
                    .child(TestNode::case("adds"))
                    .child(TestNode::case("divides").run_state(RunState::Ignored))
                    .child(TestNode::suite("Nested").child(TestNode::case("deep"))),
            )
            .child(TestNode::case("standalone").property("Category", "smoke"))
            .build()
    }

    #[test]
    fn full_names_are_relative_to_root() {
        let root = sample();
        let names: Vec<_> = root
            .depth_first()
            .map(|(depth, node)| (depth, node.full_name().to_owned()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "sample".to_owned()),
                (1, "Math".to_owned()),
                (2, "Math.adds".to_owned()),
                (2, "Math.divides".to_owned()),
                (2, "Math.Nested".to_owned()),
                (3, "Math.Nested.deep".to_owned()),
                (1, "standalone".to_owned()),
            ]
        );
    }

    #[test]
    fn paths_disambiguate_full_names() {
        let root = TestNode::suite("Tests")
            .child(TestNode::suite("Tests").child(TestNode::case("a")))
            .child(TestNode::suite("Math").child(TestNode::case("adds")))
            .child(TestNode::case("Math.adds"))
            .build();
        let nodes: Vec<_> = root
            .depth_first()
            .map(|(_, node)| (node.full_name().to_owned(), node.path().join("/")))
            .collect();
        assert_eq!(
            nodes,
            vec![
                ("Tests".to_owned(), "Tests".to_owned()),
                ("Tests".to_owned(), "Tests/Tests".to_owned()),
                ("Tests.a".to_owned(), "Tests/Tests/a".to_owned()),
                ("Math".to_owned(), "Tests/Math".to_owned()),
                ("Math.adds".to_owned(), "Tests/Math/adds".to_owned()),
                ("Math.adds".to_owned(), "Tests/Math.adds".to_owned()),
            ]
        );
    }

    #[test]
    fn test_case_counts() {
        let root = sample();
        assert_eq!(root.test_case_count(), 4);
        assert!(root.has_children());

        let math = &root.children()[0];
        assert_eq!(math.test_case_count(), 3);
        assert_eq!(math.children()[1].run_state(), RunState::Ignored);

        let standalone = &root.children()[1];
        assert_eq!(standalone.test_case_count(), 1);
        assert!(!standalone.has_children());
        assert!(!standalone.is_suite());
        assert_eq!(
            standalone.properties().get("Category"),
            Some(&vec!["smoke".to_owned()])
        );
    }

    #[test]
    fn empty_suite_has_no_cases() {
        let suite = TestNode::suite("empty").build();
        assert!(suite.is_suite());
        assert!(!suite.has_children());
        assert_eq!(suite.test_case_count(), 0);
    }

    #[test]
    fn case_with_child_becomes_suite() {
        let node = TestNode::case("parameterized")
            .child(TestNode::case("parameterized(1)"))
            .child(TestNode::case("parameterized(2)"))
            .build();
        assert!(node.is_suite());
        assert_eq!(node.test_case_count(), 2);
    }

    #[test]
    fn run_state_display() {
        assert_eq!(RunState::NotRunnable.to_string(), "NotRunnable");
        assert_eq!(
            RunState::from(RecordedRunState::Explicit),
            RunState::Explicit
        );
    }
}
