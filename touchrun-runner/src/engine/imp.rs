// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{LoadError, RunError},
    outcome::TestOutcome,
    test_tree::TestNode,
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::{collections::BTreeSet, fmt, sync::Arc};

/// Identifies a test assembly to load.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AssemblyHandle {
    path: Utf8PathBuf,
}

impl AssemblyHandle {
    /// Creates a handle for the assembly at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path to the assembly.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl fmt::Display for AssemblyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// An engine that loads and runs test assemblies.
pub trait TestEngine {
    /// Loads an assembly, replacing any previously loaded one, and returns its root suite.
    fn load(
        &mut self,
        assembly: &AssemblyHandle,
        options: &IndexMap<String, String>,
    ) -> Result<Arc<TestNode>, LoadError>;

    /// Runs the tests selected by `filter` in the loaded assembly, returning the root outcome.
    ///
    /// Returns [`RunError::NotLoaded`] if no assembly is loaded.
    fn run(
        &mut self,
        listener: &mut dyn TestListener,
        filter: &TestFilter,
    ) -> Result<Arc<TestOutcome>, RunError>;
}

/// Receives progress events while a run is in flight.
pub trait TestListener {
    /// Called when a test or suite starts.
    fn test_started(&mut self, _test: &TestNode) {}

    /// Called when a test or suite finishes. Suites finish after all their children.
    fn test_finished(&mut self, _outcome: &TestOutcome) {}
}

/// A listener that ignores every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullListener;

impl TestListener for NullListener {}

/// Selects which tests to run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum TestFilter {
    /// Runs every test except explicit ones.
    #[default]
    Empty,

    /// Runs the tests with these full names, along with everything below them.
    Names(BTreeSet<String>),
}

impl TestFilter {
    /// Creates a filter from full names. An empty list produces [`TestFilter::Empty`].
    pub fn names(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let names: BTreeSet<_> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::Empty
        } else {
            Self::Names(names)
        }
    }

    /// Returns true if this filter selects everything.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true if `full_name` is named by this filter directly.
    pub fn names_test(&self, full_name: &str) -> bool {
        match self {
            Self::Empty => false,
            Self::Names(names) => names.contains(full_name),
        }
    }

    /// Returns true if `test` is selected, given whether one of its ancestors was named.
    pub fn selects(&self, test: &TestNode, ancestor_named: bool) -> bool {
        self.is_empty() || ancestor_named || self.names_test(test.full_name())
    }

    /// Returns true if any test case at or below `test` is selected.
    pub fn selects_any(&self, test: &TestNode, ancestor_named: bool) -> bool {
        if self.selects(test, ancestor_named) {
            return true;
        }
        test.children()
            .iter()
            .any(|child| self.selects_any(child, false))
    }
}
