// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A flattened tree of presenters, one per test.

use crate::{
    outcome::TestOutcome, presenter::TestPresenter, projector::Palette, test_tree::TestNode,
};
use indexmap::{IndexMap, map::Entry};
use std::sync::Arc;
use tracing::warn;

/// One [`TestPresenter`] per node of a loaded test tree, in depth-first order.
#[derive(Debug)]
pub struct ResultTreeView {
    // Keyed by path, since full names can collide. Insertion order is depth-first.
    presenters: IndexMap<Vec<String>, (usize, TestPresenter)>,
}

impl ResultTreeView {
    /// Creates a presenter for every node under `root`, including `root` itself.
    ///
    /// Only the first of several siblings with the same name gets a presenter.
    pub fn from_suite(root: &Arc<TestNode>, palette: Arc<Palette>) -> Self {
        let mut presenters = IndexMap::new();
        for (depth, node) in root.depth_first() {
            match presenters.entry(node.path().to_vec()) {
                Entry::Occupied(_) => {
                    warn!(test = node.full_name(), "skipping duplicate test");
                }
                Entry::Vacant(entry) => {
                    entry.insert((depth, TestPresenter::new(node.clone(), palette.clone())));
                }
            }
        }
        Self { presenters }
    }

    /// Assigns every outcome in the tree under `outcome` to the presenter with the same path.
    ///
    /// Returns the number of presenters whose outcome changed. Outcomes for tests that aren't in
    /// this view are skipped.
    pub fn apply(&mut self, outcome: &Arc<TestOutcome>) -> usize {
        let mut changed = 0;
        for (_, outcome) in outcome.depth_first() {
            match self.presenters.get_mut(outcome.test().path()) {
                Some((_, presenter)) => {
                    if presenter.set_outcome(outcome.clone()) {
                        changed += 1;
                    }
                }
                None => {
                    warn!(
                        test = outcome.test().full_name(),
                        "ignoring outcome for unknown test"
                    );
                }
            }
        }
        changed
    }

    /// Returns the first presenter, in depth-first order, for a test with this full name.
    pub fn get(&self, full_name: &str) -> Option<&TestPresenter> {
        self.presenters
            .values()
            .map(|(_, presenter)| presenter)
            .find(|presenter| presenter.node().full_name() == full_name)
    }

    /// Returns the first presenter, in depth-first order, for a test with this full name, mutably.
    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut TestPresenter> {
        self.presenters
            .values_mut()
            .map(|(_, presenter)| presenter)
            .find(|presenter| presenter.node().full_name() == full_name)
    }

    /// Returns the presenter for the test at this path.
    pub fn get_path(&self, path: &[String]) -> Option<&TestPresenter> {
        self.presenters.get(path).map(|(_, presenter)| presenter)
    }

    /// Iterates over presenters in depth-first order along with their depth. The root has depth 0.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &TestPresenter)> + '_ {
        self.presenters
            .values()
            .map(|(depth, presenter)| (*depth, presenter))
    }

    /// Iterates mutably over presenters in depth-first order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TestPresenter> + '_ {
        self.presenters.values_mut().map(|(_, presenter)| presenter)
    }

    /// The number of presenters.
    pub fn len(&self) -> usize {
        self.presenters.len()
    }

    /// Returns true if there are no presenters.
    pub fn is_empty(&self) -> bool {
        self.presenters.is_empty()
    }
}
