// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateful view-models binding a test to its current outcome.
//!
//! A [`TestPresenter`] holds one [`TestNode`] and at most one [`TestOutcome`]. Replacing the
//! outcome re-derives the display fields through the [projector](crate::projector) and notifies
//! subscribers of each field that was re-derived.
//!
//! Presenters don't marshal notifications onto any particular thread: callbacks run on whichever
//! thread calls [`set_outcome`](TestPresenter::set_outcome). Mutation requires `&mut self`, so
//! callers sharing a presenter across threads must serialize access themselves.

use crate::{
    detail::ResultDetail,
    outcome::TestOutcome,
    projector::{self, Color, DisplayRecord, Palette},
    test_tree::TestNode,
};
use debug_ignore::DebugIgnore;
use std::{fmt, sync::Arc};
use tracing::trace;

/// A derived field of a [`TestPresenter`] that subscribers are notified about.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum PresenterField {
    /// [`TestPresenter::color`].
    Color,

    /// [`TestPresenter::status_line`].
    StatusLine,
}

impl PresenterField {
    /// The name of the field, as reported to observers.
    pub fn name(self) -> &'static str {
        match self {
            PresenterField::Color => "color",
            PresenterField::StatusLine => "statusLine",
        }
    }
}

impl fmt::Display for PresenterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies a subscription made through [`TestPresenter::subscribe`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct SubscriptionId(u64);

type ChangeCallback = Box<dyn FnMut(PresenterField, &DisplayRecord) + Send>;

/// A view-model for a single test.
#[derive(Debug)]
pub struct TestPresenter {
    node: Arc<TestNode>,
    outcome: Option<Arc<TestOutcome>>,
    palette: Arc<Palette>,
    record: DisplayRecord,
    subscribers: DebugIgnore<Vec<(SubscriptionId, ChangeCallback)>>,
    next_subscription: u64,
}

impl TestPresenter {
    /// Creates a presenter for a test that hasn't been executed.
    pub fn new(node: Arc<TestNode>, palette: Arc<Palette>) -> Self {
        let record = projector::project(&node, None, &palette);
        Self {
            node,
            outcome: None,
            palette,
            record,
            subscribers: DebugIgnore(Vec::new()),
            next_subscription: 0,
        }
    }

    /// Creates a presenter from an outcome, binding it to the outcome's test.
    pub fn from_outcome(outcome: Arc<TestOutcome>, palette: Arc<Palette>) -> Self {
        let mut this = Self::new(outcome.test().clone(), palette);
        this.set_outcome(outcome);
        this
    }

    /// The short name of the test.
    pub fn name(&self) -> &str {
        self.node.name()
    }

    /// The test.
    pub fn node(&self) -> &Arc<TestNode> {
        &self.node
    }

    /// The current outcome, or `None` if the test hasn't been executed.
    pub fn outcome(&self) -> Option<&Arc<TestOutcome>> {
        self.outcome.as_ref()
    }

    /// The color derived from the current outcome.
    pub fn color(&self) -> Color {
        self.record.color
    }

    /// The status line derived from the test and its current outcome.
    pub fn status_line(&self) -> &str {
        &self.record.status_line
    }

    /// All derived display fields.
    pub fn display_record(&self) -> &DisplayRecord {
        &self.record
    }

    /// Returns a detailed view of the current outcome, if there is one.
    pub fn detail(&self) -> Option<ResultDetail> {
        self.outcome
            .as_ref()
            .map(|outcome| ResultDetail::new(outcome, &self.palette))
    }

    /// Replaces the current outcome.
    ///
    /// If `outcome` is a different outcome from the current one (compared by identity, with
    /// `None` distinct from any outcome), the display fields are re-derived, subscribers are
    /// notified of [`PresenterField::Color`] and then [`PresenterField::StatusLine`], and this
    /// returns true. Otherwise nothing happens and this returns false.
    ///
    /// The outcome must belong to this presenter's test.
    pub fn set_outcome(&mut self, outcome: impl Into<Option<Arc<TestOutcome>>>) -> bool {
        let outcome = outcome.into();
        let unchanged = match (&self.outcome, &outcome) {
            (None, None) => true,
            (Some(old), Some(new)) => Arc::ptr_eq(old, new),
            _ => false,
        };
        if unchanged {
            return false;
        }

        if let Some(new) = &outcome {
            debug_assert_eq!(
                new.test().path(),
                self.node.path(),
                "outcome must belong to the presenter's test"
            );
        }

        self.outcome = outcome;
        self.record = projector::project(&self.node, self.outcome.as_deref(), &self.palette);
        trace!(
            test = self.node.full_name(),
            status_line = %self.record.status_line,
            "presenter outcome replaced",
        );

        self.notify(PresenterField::Color);
        self.notify(PresenterField::StatusLine);
        true
    }

    /// Registers a callback invoked with each field re-derived by
    /// [`set_outcome`](Self::set_outcome), along with the new display fields.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(PresenterField, &DisplayRecord) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscription. Returns false if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, field: PresenterField) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(field, &self.record);
        }
    }
}
