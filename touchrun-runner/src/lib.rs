// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for touchrun, a test-runner front end.
//!
//! The basic flow is:
//!
//! 1. A [`TestEngine`](engine::TestEngine) loads a test assembly into a tree of
//!    [`TestNode`](test_tree::TestNode)s and runs it, producing a tree of
//!    [`TestOutcome`](outcome::TestOutcome)s.
//! 2. One [`TestPresenter`](presenter::TestPresenter) is bound per node (see
//!    [`ResultTreeView`](tree_view::ResultTreeView)). Whenever a presenter's outcome changes, it
//!    re-derives its display fields through the [`projector`] and notifies subscribers.
//! 3. A [`ResultReporter`](reporter::ResultReporter) writes a textual summary of the run.

pub mod config;
pub mod detail;
pub mod engine;
pub mod errors;
mod helpers;
pub mod outcome;
pub mod presenter;
pub mod projector;
pub mod reporter;
pub mod runner;
pub mod test_tree;
pub mod tree_view;
pub mod write_str;
