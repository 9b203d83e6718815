// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interface to test-execution engines.
//!
//! touchrun doesn't discover or execute tests itself. An engine implementing [`TestEngine`] loads
//! an assembly into a [`TestNode`](crate::test_tree::TestNode) tree and runs it synchronously,
//! producing a [`TestOutcome`](crate::outcome::TestOutcome) tree.
//!
//! [`RecordedEngine`] is an engine that replays a recorded test tree.

mod imp;
mod recorded;

pub use imp::*;
pub use recorded::*;
