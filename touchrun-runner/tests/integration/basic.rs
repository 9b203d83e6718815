// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::{Result, ensure};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use touchrun_runner::{
    config::TouchrunConfig,
    engine::{AssemblyHandle, NullListener, RecordedEngine, TestFilter, TestListener},
    outcome::{ResultState, TestOutcome, TestStatus},
    projector::{Color, Palette},
    reporter::{Banner, ResultReporter, ResultReporterBuilder, RuntimeEnvironment},
    runner::AssemblyRunner,
    tree_view::ResultTreeView,
};

fn reporter() -> ResultReporter {
    ResultReporterBuilder::default()
        .set_banner(Banner::new("0.1.0", "test"))
        .set_environment(RuntimeEnvironment {
            os: "linux".to_owned(),
            arch: "x86_64".to_owned(),
        })
        .build()
}

#[derive(Default)]
struct FinishedNames(Vec<String>);

impl TestListener for FinishedNames {
    fn test_finished(&mut self, outcome: &TestOutcome) {
        self.0.push(outcome.test().full_name().to_owned());
    }
}

fn status_lines(view: &ResultTreeView) -> Vec<String> {
    view.iter()
        .map(|(depth, presenter)| {
            format!(
                "{:indent$}{}: {}",
                "",
                presenter.name(),
                presenter.status_line(),
                indent = depth * 2
            )
        })
        .collect()
}

#[test]
fn test_run_calculator() -> Result<()> {
    let fixture = AssemblyFixture::new(&calculator())?;
    let mut runner = AssemblyRunner::new(RecordedEngine::new(), IndexMap::new());
    let root = runner.add_assembly(&AssemblyHandle::new(&fixture.path))?;
    assert_eq!(root.test_case_count(), 12);

    let mut view = ResultTreeView::from_suite(&root, Arc::new(Palette::default()));
    assert_eq!(view.len(), 15);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    view.get_mut("Arithmetic")
        .expect("Arithmetic presenter exists")
        .subscribe(move |field, _| sink.lock().unwrap().push(field.name()));

    let mut listener = FinishedNames::default();
    let mut report = String::new();
    let outcome = runner.execute(
        &mut listener,
        &TestFilter::Empty,
        &reporter(),
        &mut report,
    )?;

    // Children finish before their parents, and the root finishes last.
    assert_eq!(listener.0.len(), 15);
    assert_eq!(listener.0.first().map(String::as_str), Some("Arithmetic.adds_0"));
    assert_eq!(listener.0.last().map(String::as_str), Some("calculator.dll"));

    assert_eq!(outcome.overall_state(), ResultState::CHILD_FAILURE);
    assert_eq!(outcome.pass_count(), 8);
    assert_eq!(outcome.fail_count(), 2);
    assert_eq!(outcome.skip_count(), 2);

    assert_eq!(view.apply(&outcome), 15);
    assert_eq!(*events.lock().unwrap(), vec!["color", "statusLine"]);

    assert_eq!(
        status_lines(&view),
        vec![
            "calculator.dll: Failure! 12 test(s) - 2 failed, 8 passed",
            "  Arithmetic: Failure! 10 test(s) - 2 failed, 8 passed",
            "    adds_0: Success! 125 ms for 1 assertion(s)",
            "    adds_1: Success! 125 ms for 1 assertion(s)",
            "    adds_2: Success! 125 ms for 1 assertion(s)",
            "    adds_3: Success! 125 ms for 1 assertion(s)",
            "    adds_4: Success! 125 ms for 1 assertion(s)",
            "    adds_5: Success! 125 ms for 1 assertion(s)",
            "    adds_6: Success! 125 ms for 1 assertion(s)",
            "    adds_7: Success! 125 ms for 1 assertion(s)",
            "    divides_0: Failure! expected 0, got 1",
            "    divides_1: Failure! expected 1, got 2",
            "  Extra: Failure! 2 test(s) - 0 failed, 0 passed",
            "    ignored: Failure! flaky on CI",
            "    explicit: Failure! ",
        ]
    );

    let color = |name: &str| view.get(name).map(|presenter| presenter.color());
    assert_eq!(color("calculator.dll"), Some(Palette::DEFAULT_FAILED));
    assert_eq!(color("Arithmetic.adds_3"), Some(Palette::DEFAULT_PASSED));
    assert_eq!(color("Extra"), Some(Palette::DEFAULT_SKIPPED));

    let detail = view
        .get("Arithmetic.divides_1")
        .and_then(|presenter| presenter.detail())
        .expect("divides_1 has been executed");
    assert_eq!(detail.message, "expected 1, got 2");
    assert_eq!(detail.stack_trace, "at Arithmetic.divides_1()");
    assert_eq!(detail.output, "<none>");

    ensure!(
        report.contains(
            "  Test Count: 12, Passed: 8, Failed: 2, Warnings: 0, Inconclusive: 0, Skipped: 2\n\
             \x20 Duration: 1.500 seconds\n"
        ),
        "summary counts missing from:\n{report}"
    );
    ensure!(
        report.contains(
            "1) Failed : Arithmetic.divides_0\n   expected 0, got 1\n   at Arithmetic.divides_0()\n"
        ),
        "failure missing from:\n{report}"
    );
    ensure!(
        report.contains(
            "Tests Not Run\n\n1) Skipped:Ignored : Extra.ignored\n   flaky on CI\n\n\
             2) Skipped:Explicit : Extra.explicit\n"
        ),
        "not-run list missing from:\n{report}"
    );

    Ok(())
}

#[test]
fn test_named_explicit_test_runs() -> Result<()> {
    let fixture = AssemblyFixture::new(&calculator())?;
    let mut runner = AssemblyRunner::new(RecordedEngine::new(), IndexMap::new());
    let root = runner.add_assembly(&AssemblyHandle::new(&fixture.path))?;
    let mut view = ResultTreeView::from_suite(&root, Arc::new(Palette::default()));

    let full_run = runner.execute(
        &mut NullListener,
        &TestFilter::Empty,
        &reporter(),
        &mut String::new(),
    )?;
    assert_eq!(view.apply(&full_run), 15);

    let explicit_run = runner.execute(
        &mut NullListener,
        &TestFilter::names(["Extra.explicit"]),
        &reporter(),
        &mut String::new(),
    )?;
    assert_eq!(explicit_run.overall_state().status, TestStatus::Passed);
    assert_eq!(explicit_run.counts().total(), 1);

    // Only the presenters for the tests in the second run change.
    assert_eq!(view.apply(&explicit_run), 3);
    let status_line = |name: &str| {
        view.get(name)
            .map(|presenter| presenter.status_line().to_owned())
            .unwrap_or_default()
    };
    assert_eq!(
        status_line("calculator.dll"),
        "Success! 500 ms for 1 test(s); 0 skipped"
    );
    assert_eq!(status_line("Extra.explicit"), "Success! 500 ms for 4 assertion(s)");
    assert_eq!(
        status_line("Arithmetic"),
        "Failure! 10 test(s) - 2 failed, 8 passed"
    );

    Ok(())
}

#[test]
fn test_configured_palette_colors_tree() -> Result<()> {
    let fixture = AssemblyFixture::new(&calculator())?;
    let config_dir = camino_tempfile::Utf8TempDir::new()?;
    let config_path = config_dir.path().join("touchrun.toml");
    std::fs::write(
        &config_path,
        "[palette]\nfailed = \"#ff0000\"\n\n[run.options]\nseed = \"7\"\n",
    )?;
    let config = TouchrunConfig::from_sources(config_dir.path(), Some(&config_path))?;

    let mut runner = AssemblyRunner::new(RecordedEngine::new(), config.run_options().clone());
    let root = runner.add_assembly(&AssemblyHandle::new(&fixture.path))?;
    let mut view = ResultTreeView::from_suite(&root, config.palette().clone());
    let outcome = runner.execute(
        &mut NullListener,
        &TestFilter::names(["Arithmetic.divides_0"]),
        &reporter(),
        &mut String::new(),
    )?;
    view.apply(&outcome);

    let red = Color::rgb(0xff, 0, 0);
    assert_eq!(view.get("Arithmetic").map(|p| p.color()), Some(red));
    assert_eq!(view.get("Arithmetic.divides_0").map(|p| p.color()), Some(red));
    assert_eq!(
        view.get("Arithmetic.divides_1").map(|p| p.color()),
        Some(Color::TRANSPARENT)
    );

    Ok(())
}

#[test]
fn test_recorded_json_round_trips() -> Result<()> {
    let recorded = calculator();
    let json = recorded.to_json_pretty()?;
    let parsed = touchrun_metadata::RecordedTest::parse_json(&json)?;
    assert_eq!(parsed, recorded);
    Ok(())
}
