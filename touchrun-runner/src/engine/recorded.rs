// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{AssemblyHandle, TestEngine, TestFilter, TestListener};
use crate::{
    errors::{LoadError, RecordedTestError, RunError},
    outcome::{ResultState, TestOutcome, TestOutcomeBuilder},
    test_tree::{RunState, TestNode, TestNodeBuilder},
};
use camino::Utf8Path;
use indexmap::IndexMap;
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
    time::{Duration, TryFromFloatSecsError},
};
use touchrun_metadata::{RecordedResult, RecordedTest};
use tracing::debug;

/// The message attached to a test case that has no recorded result.
pub const NO_RECORDED_RESULT: &str = "no recorded result";

/// A [`TestEngine`] that replays results recorded in a JSON file.
///
/// The file holds a single [`RecordedTest`] tree. Loading builds the [`TestNode`] tree from it;
/// running replays each node's recorded result, subject to the filter and to each node's static
/// [`RunState`].
#[derive(Debug, Default)]
pub struct RecordedEngine {
    loaded: Option<LoadedAssembly>,
}

#[derive(Debug)]
struct LoadedAssembly {
    root: Arc<TestNode>,
    // Keyed by path. Every node has an entry, even those recorded without a result.
    results: HashMap<Vec<String>, Option<ReplayResult>>,
}

#[derive(Clone, Debug)]
struct ReplayResult {
    state: ResultState,
    message: Option<String>,
    output: Option<String>,
    stack_trace: Option<String>,
    duration: Duration,
    assert_count: usize,
}

impl RecordedEngine {
    /// Creates an engine with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the root of the loaded assembly, if any.
    pub fn root(&self) -> Option<&Arc<TestNode>> {
        self.loaded.as_ref().map(|loaded| &loaded.root)
    }

    /// Loads a recorded tree that has already been parsed. `path` is only used for errors.
    pub fn load_recorded(
        &mut self,
        path: &Utf8Path,
        recorded: &RecordedTest,
    ) -> Result<Arc<TestNode>, LoadError> {
        let root = node_builder(recorded).build();

        let mut results = HashMap::new();
        collect_results(path, recorded, &root, &mut results)?;

        debug!(
            assembly = %path,
            test_cases = root.test_case_count(),
            recorded_results = results.len(),
            "loaded recorded assembly",
        );
        self.loaded = Some(LoadedAssembly {
            root: root.clone(),
            results,
        });
        Ok(root)
    }
}

impl TestEngine for RecordedEngine {
    fn load(
        &mut self,
        assembly: &AssemblyHandle,
        options: &IndexMap<String, String>,
    ) -> Result<Arc<TestNode>, LoadError> {
        for (key, value) in options {
            debug!(key, value, "engine option");
        }

        let path = assembly.path();
        let json = std::fs::read_to_string(path).map_err(|err| LoadError::Read {
            path: path.to_owned(),
            err,
        })?;
        let recorded = RecordedTest::parse_json(&json).map_err(|err| LoadError::Parse {
            path: path.to_owned(),
            err,
        })?;
        self.load_recorded(path, &recorded)
    }

    fn run(
        &mut self,
        listener: &mut dyn TestListener,
        filter: &TestFilter,
    ) -> Result<Arc<TestOutcome>, RunError> {
        let loaded = self.loaded.as_ref().ok_or(RunError::NotLoaded)?;
        let replay = Replay {
            results: &loaded.results,
            filter,
        };
        // The root is always reported, even if the filter excludes everything below it.
        Ok(replay.node(&loaded.root, false, false, listener))
    }
}

fn node_builder(recorded: &RecordedTest) -> TestNodeBuilder {
    let builder = if recorded.children.is_empty() {
        TestNode::case(&recorded.name)
    } else {
        TestNode::suite(&recorded.name).children(recorded.children.iter().map(node_builder))
    };
    let builder = recorded
        .properties
        .iter()
        .flat_map(|(key, values)| values.iter().map(move |value| (key, value)))
        .fold(builder, |builder, (key, value)| builder.property(key, value));
    builder.run_state(recorded.run_state.into())
}

fn collect_results(
    path: &Utf8Path,
    recorded: &RecordedTest,
    node: &TestNode,
    results: &mut HashMap<Vec<String>, Option<ReplayResult>>,
) -> Result<(), LoadError> {
    let full_name = node.full_name();
    let result = match &recorded.result {
        Some(result) => Some(replay_result(result).map_err(|err| LoadError::InvalidTest {
            path: path.to_owned(),
            full_name: full_name.to_owned(),
            err,
        })?),
        None => None,
    };

    match results.entry(node.path().to_vec()) {
        Entry::Occupied(_) => {
            return Err(LoadError::DuplicateTest {
                path: path.to_owned(),
                full_name: full_name.to_owned(),
            });
        }
        Entry::Vacant(entry) => {
            entry.insert(result);
        }
    }

    for (recorded_child, child) in recorded.children.iter().zip(node.children()) {
        collect_results(path, recorded_child, child, results)?;
    }
    Ok(())
}

fn replay_result(result: &RecordedResult) -> Result<ReplayResult, RecordedTestError> {
    let duration = floor_duration(result.duration_secs).map_err(|err| {
        RecordedTestError::InvalidDuration {
            secs: result.duration_secs,
            err,
        }
    })?;
    Ok(ReplayResult {
        state: ResultState::new(result.status.into(), result.label.into()),
        message: result.message.clone(),
        output: result.output.clone(),
        stack_trace: result.stack_trace.clone(),
        duration,
        assert_count: result.assert_count,
    })
}

/// Converts recorded seconds to a duration, truncating to whole nanoseconds.
///
/// `Duration::try_from_secs_f64` rounds to the nearest nanosecond, which can carry a value just
/// under a millisecond boundary over it.
fn floor_duration(secs: f64) -> Result<Duration, TryFromFloatSecsError> {
    // Rejects negative, non-finite and overflowing values.
    Duration::try_from_secs_f64(secs)?;
    let nanos = (secs.fract() * 1e9).floor();
    Ok(Duration::new(secs.trunc() as u64, (nanos as u32).min(999_999_999)))
}

struct Replay<'a> {
    results: &'a HashMap<Vec<String>, Option<ReplayResult>>,
    filter: &'a TestFilter,
}

impl Replay<'_> {
    fn node(
        &self,
        node: &Arc<TestNode>,
        ancestor_named: bool,
        ancestor_explicit: bool,
        listener: &mut dyn TestListener,
    ) -> Arc<TestOutcome> {
        listener.test_started(node);

        let named = ancestor_named || self.filter.names_test(node.full_name());
        let explicit = ancestor_explicit || node.run_state() == RunState::Explicit;
        let recorded = self.results.get(node.path()).and_then(Option::as_ref);

        let outcome = if node.is_suite() {
            let children: Vec<_> = node
                .children()
                .iter()
                .filter(|child| self.filter.selects_any(child, named))
                .map(|child| self.node(child, named, explicit, listener))
                .collect();
            let state = static_state(node.run_state(), explicit && !named)
                .or(recorded.map(|result| result.state))
                .unwrap_or(ResultState::SUCCESS);
            let duration = match recorded {
                Some(result) => result.duration,
                None => children.iter().map(|child| child.duration()).sum(),
            };
            with_details(TestOutcome::builder(node.clone(), state), recorded)
                .duration(duration)
                .children(children)
                .build()
        } else {
            match static_state(node.run_state(), explicit && !named) {
                Some(state) => {
                    let mut builder = TestOutcome::builder(node.clone(), state);
                    if let Some(message) = recorded.and_then(|result| result.message.as_deref()) {
                        builder = builder.message(message);
                    }
                    builder.build()
                }
                None => match recorded {
                    Some(result) => {
                        with_details(TestOutcome::builder(node.clone(), result.state), recorded)
                            .duration(result.duration)
                            .assert_count(result.assert_count)
                            .build()
                    }
                    None => TestOutcome::builder(node.clone(), ResultState::INCONCLUSIVE)
                        .message(NO_RECORDED_RESULT)
                        .build(),
                },
            }
        };

        listener.test_finished(&outcome);
        outcome
    }
}

fn static_state(run_state: RunState, unselected_explicit: bool) -> Option<ResultState> {
    match run_state {
        RunState::Skipped => Some(ResultState::SKIPPED),
        RunState::Ignored => Some(ResultState::IGNORED),
        RunState::NotRunnable => Some(ResultState::NOT_RUNNABLE),
        RunState::Runnable | RunState::Explicit => {
            unselected_explicit.then_some(ResultState::EXPLICIT)
        }
    }
}

fn with_details(
    mut builder: TestOutcomeBuilder,
    recorded: Option<&ReplayResult>,
) -> TestOutcomeBuilder {
    let Some(result) = recorded else {
        return builder;
    };
    if let Some(message) = &result.message {
        builder = builder.message(message);
    }
    if let Some(output) = &result.output {
        builder = builder.output(output);
    }
    if let Some(stack_trace) = &result.stack_trace {
        builder = builder.stack_trace(stack_trace);
    }
    builder
}
