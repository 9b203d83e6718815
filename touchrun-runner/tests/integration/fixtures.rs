// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use camino_tempfile::Utf8TempDir;
use color_eyre::eyre::Result;
use touchrun_metadata::{
    RecordedLabel, RecordedResult, RecordedRunState, RecordedStatus, RecordedTest,
};

pub(crate) fn leaf(name: &str, status: RecordedStatus, millis: u32, asserts: usize) -> RecordedTest {
    RecordedTest {
        name: name.to_owned(),
        run_state: RecordedRunState::Runnable,
        properties: Default::default(),
        children: Vec::new(),
        result: Some(RecordedResult {
            status,
            label: RecordedLabel::None,
            message: None,
            output: None,
            stack_trace: None,
            duration_secs: f64::from(millis) / 1000.0,
            assert_count: asserts,
        }),
    }
}

pub(crate) fn suite(name: &str, children: Vec<RecordedTest>) -> RecordedTest {
    RecordedTest {
        name: name.to_owned(),
        run_state: RecordedRunState::Runnable,
        properties: Default::default(),
        children,
        result: None,
    }
}

/// A calculator assembly: ten arithmetic tests, two of which fail, plus a suite of skipped tests.
pub(crate) fn calculator() -> RecordedTest {
    let mut arithmetic: Vec<_> = (0..8)
        .map(|i| leaf(&format!("adds_{i}"), RecordedStatus::Passed, 125, 1))
        .collect();
    for i in 0..2 {
        let mut failed = leaf(&format!("divides_{i}"), RecordedStatus::Failed, 250, 1);
        if let Some(result) = &mut failed.result {
            result.message = Some(format!("expected {i}, got {}", i + 1));
            result.stack_trace = Some(format!("at Arithmetic.divides_{i}()"));
        }
        arithmetic.push(failed);
    }

    let mut ignored = leaf("ignored", RecordedStatus::Passed, 0, 0);
    ignored.run_state = RecordedRunState::Ignored;
    if let Some(result) = &mut ignored.result {
        result.message = Some("flaky on CI".to_owned());
    }
    let mut explicit = leaf("explicit", RecordedStatus::Passed, 500, 4);
    explicit.run_state = RecordedRunState::Explicit;

    suite(
        "calculator.dll",
        vec![
            suite("Arithmetic", arithmetic),
            suite("Extra", vec![ignored, explicit]),
        ],
    )
}

/// A recorded assembly written to a temporary directory.
pub(crate) struct AssemblyFixture {
    _dir: Utf8TempDir,
    pub(crate) path: Utf8PathBuf,
}

impl AssemblyFixture {
    pub(crate) fn new(recorded: &RecordedTest) -> Result<Self> {
        let dir = Utf8TempDir::new()?;
        let path = dir.path().join("assembly.json");
        std::fs::write(&path, recorded.to_json_pretty()?)?;
        Ok(Self { _dir: dir, path })
    }
}
