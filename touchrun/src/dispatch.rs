// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line parsing and command routing.

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use owo_colors::{OwoColorize, Style};
use std::io;
use touchrun_runner::{
    config::TouchrunConfig,
    engine::{AssemblyHandle, RecordedEngine, TestFilter, TestListener},
    outcome::{TestOutcome, TestStatus},
    reporter::{Banner, ResultReporterBuilder},
    runner::AssemblyRunner,
    test_tree::TestNode,
    tree_view::ResultTreeView,
    write_str::WriteStr,
};
use tracing::{debug, warn};

/// Loads a test assembly, runs it and shows the results as a colored tree.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles(),
    max_term_width = 100
)]
pub struct TouchrunApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(flatten)]
    config_opts: ConfigOpts,

    #[clap(subcommand)]
    command: Command,
}

impl TouchrunApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code on success.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = TouchrunConfig::from_sources(
            Utf8Path::new("."),
            self.config_opts.config_file.as_deref(),
        )?;
        match self.command {
            Command::List(opts) => opts.exec(&config, output_writer),
            Command::Run(opts) => opts.exec(&config, output, output_writer),
        }
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Config options")]
struct ConfigOpts {
    /// Config file [default: .config/touchrun.toml]
    #[arg(long = "config", global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the tests in an assembly without running them
    List(ListOpts),

    /// Run the tests in an assembly
    ///
    /// Writes a summary report followed by the tree of results. The exit code is non-zero if any
    /// test failed.
    Run(RunOpts),
}

#[derive(Debug, Args)]
struct ListOpts {
    /// The recorded test assembly to load
    #[arg(value_name = "ASSEMBLY")]
    assembly: Utf8PathBuf,
}

impl ListOpts {
    fn exec(self, config: &TouchrunConfig, output_writer: &mut OutputWriter) -> Result<i32> {
        let mut runner = AssemblyRunner::new(RecordedEngine::new(), config.run_options().clone());
        let root = runner.add_assembly(&AssemblyHandle::new(self.assembly))?;
        let view = ResultTreeView::from_suite(&root, config.palette().clone());

        let mut writer = output_writer.stdout_writer();
        write_tree(&view, false, &mut *writer)
            .and_then(|()| writer.write_str_flush())
            .map_err(|err| ExpectedError::WriteError { err })?;
        Ok(0)
    }
}

#[derive(Debug, Args)]
struct RunOpts {
    /// The recorded test assembly to load
    #[arg(value_name = "ASSEMBLY")]
    assembly: Utf8PathBuf,

    /// Run only these tests, by full name, along with everything below them
    #[arg(long = "filter", short = 'F', value_name = "NAME")]
    filters: Vec<String>,

    /// Don't write the result tree after the report
    #[arg(long)]
    no_tree: bool,
}

impl RunOpts {
    fn exec(
        self,
        config: &TouchrunConfig,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let colorize = output.colorize_stdout();
        let mut runner = AssemblyRunner::new(RecordedEngine::new(), config.run_options().clone());
        let root = runner.add_assembly(&AssemblyHandle::new(self.assembly))?;

        let mut view = ResultTreeView::from_suite(&root, config.palette().clone());
        if output.verbose {
            for presenter in view.iter_mut() {
                let full_name = presenter.node().full_name().to_owned();
                presenter.subscribe(move |field, record| {
                    debug!(
                        test = %full_name,
                        %field,
                        color = %record.color,
                        status_line = %record.status_line,
                        "presenter changed",
                    );
                });
            }
        }

        let filter = TestFilter::names(self.filters);
        let reporter = ResultReporterBuilder::default()
            .set_colorize(colorize)
            .set_show_failures(config.show_failures())
            .set_show_not_run(config.show_not_run())
            .set_banner(Banner::for_version(env!("CARGO_PKG_VERSION")))
            .build();

        let mut writer = output_writer.stdout_writer();
        let outcome = runner.execute(&mut LogListener, &filter, &reporter, &mut *writer)?;
        if !filter.is_empty() && outcome.counts().total() == 0 {
            warn!("no tests matched the given filters");
        }

        if !self.no_tree {
            let changed = view.apply(&outcome);
            debug!("{changed} presenters updated");
            writeln!(writer)
                .and_then(|()| write_tree(&view, colorize, &mut *writer))
                .and_then(|()| writer.write_str_flush())
                .map_err(|err| ExpectedError::WriteError { err })?;
        }

        if outcome.overall_state().status == TestStatus::Failed {
            Err(ExpectedError::TestRunFailed)
        } else {
            Ok(0)
        }
    }
}

/// Logs progress events at debug level.
struct LogListener;

impl TestListener for LogListener {
    fn test_started(&mut self, test: &TestNode) {
        debug!(test = test.full_name(), "started");
    }

    fn test_finished(&mut self, outcome: &TestOutcome) {
        debug!(
            test = outcome.test().full_name(),
            state = %outcome.state(),
            "finished",
        );
    }
}

fn write_tree(view: &ResultTreeView, colorize: bool, writer: &mut dyn WriteStr) -> io::Result<()> {
    for (depth, presenter) in view.iter() {
        let color = presenter.color();
        let style = if colorize && !color.is_transparent() {
            Style::new().truecolor(color.r, color.g, color.b).bold()
        } else {
            Style::new()
        };
        writeln!(
            writer,
            "{:indent$}{}: {}",
            "",
            presenter.name().style(style),
            presenter.status_line(),
            indent = depth * 2,
        )?;
    }
    Ok(())
}
