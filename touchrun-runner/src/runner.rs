// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drives a [`TestEngine`] through a load and a run, writing a report along the way.

use crate::{
    engine::{AssemblyHandle, TestEngine, TestFilter, TestListener},
    errors::{ExecuteError, LoadError},
    helpers::plural,
    outcome::TestOutcome,
    reporter::ResultReporter,
    test_tree::TestNode,
    write_str::WriteStr,
};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads an assembly into an engine and executes it.
#[derive(Debug)]
pub struct AssemblyRunner<E> {
    engine: E,
    options: IndexMap<String, String>,
    root: Option<Arc<TestNode>>,
}

impl<E: TestEngine> AssemblyRunner<E> {
    /// Creates a runner. `options` are passed to the engine on every load.
    pub fn new(engine: E, options: IndexMap<String, String>) -> Self {
        Self {
            engine,
            options,
            root: None,
        }
    }

    /// Loads an assembly, replacing any previously loaded one.
    pub fn add_assembly(&mut self, assembly: &AssemblyHandle) -> Result<Arc<TestNode>, LoadError> {
        debug!(%assembly, "loading test assembly");
        let root = self.engine.load(assembly, &self.options)?;
        let count = root.test_case_count();
        info!(
            "loaded {count} {} from {assembly}",
            plural::test_cases_str(count)
        );
        self.root = Some(root.clone());
        Ok(root)
    }

    /// The root of the loaded assembly, if any.
    pub fn root(&self) -> Option<&Arc<TestNode>> {
        self.root.as_ref()
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Writes the report header, runs the loaded assembly and writes the report for the run.
    pub fn execute(
        &mut self,
        listener: &mut dyn TestListener,
        filter: &TestFilter,
        reporter: &ResultReporter,
        writer: &mut dyn WriteStr,
    ) -> Result<Arc<TestOutcome>, ExecuteError> {
        reporter.write_header(writer).map_err(ExecuteError::Write)?;
        reporter
            .write_runtime_environment(writer)
            .map_err(ExecuteError::Write)?;

        let outcome = self.engine.run(listener, filter)?;
        let count = outcome.counts().total();
        info!(
            "ran {count} {}: {}",
            plural::tests_str(count),
            outcome.overall_state()
        );

        reporter
            .write_report(&outcome, writer)
            .map_err(ExecuteError::Write)?;
        Ok(outcome)
    }
}
