// Copyright (c) The touchrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Textual reports for a test run.
//!
//! The [`ResultReporter`] writes a header, a description of the runtime environment, and a summary
//! of a finished run followed by lists of failures and of tests that weren't run.

use crate::{
    helpers::write_indented,
    outcome::{TestOutcome, TestStatus},
    write_str::WriteStr,
};
use owo_colors::{OwoColorize, Style};
use std::{io, sync::Arc};

/// The copyright line written after the version in the header.
pub const COPYRIGHT: &str = "Copyright (c) The touchrun Contributors";

const INDENT: &str = "   ";

/// Identifies the program writing the report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Banner {
    /// The program version.
    pub version: String,

    /// The build flavor, e.g. `release`.
    pub build: String,

    /// The copyright line.
    pub copyright: String,
}

impl Banner {
    /// Creates a banner with the default copyright line.
    pub fn new(version: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build: build.into(),
            copyright: COPYRIGHT.to_owned(),
        }
    }

    /// Creates a banner for `version`, naming the build profile this crate was compiled with.
    pub fn for_version(version: impl Into<String>) -> Self {
        let build = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        };
        Self::new(version, build)
    }
}

impl Default for Banner {
    fn default() -> Self {
        Self::for_version(env!("CARGO_PKG_VERSION"))
    }
}

/// The platform the run happens on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuntimeEnvironment {
    /// The operating system.
    pub os: String,

    /// The CPU architecture.
    pub arch: String,
}

impl RuntimeEnvironment {
    /// Describes the platform this process is running on.
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_owned(),
            arch: std::env::consts::ARCH.to_owned(),
        }
    }
}

/// Builds a [`ResultReporter`].
#[derive(Clone, Debug)]
pub struct ResultReporterBuilder {
    should_colorize: bool,
    show_failures: bool,
    show_not_run: bool,
    banner: Option<Banner>,
    environment: Option<RuntimeEnvironment>,
}

impl Default for ResultReporterBuilder {
    fn default() -> Self {
        Self {
            should_colorize: false,
            show_failures: true,
            show_not_run: true,
            banner: None,
            environment: None,
        }
    }
}

impl ResultReporterBuilder {
    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets whether the list of errors, failures and warnings is written.
    pub fn set_show_failures(&mut self, show_failures: bool) -> &mut Self {
        self.show_failures = show_failures;
        self
    }

    /// Sets whether the list of tests that weren't run is written.
    pub fn set_show_not_run(&mut self, show_not_run: bool) -> &mut Self {
        self.show_not_run = show_not_run;
        self
    }

    /// Overrides the banner written in the header.
    pub fn set_banner(&mut self, banner: Banner) -> &mut Self {
        self.banner = Some(banner);
        self
    }

    /// Overrides the runtime environment. Defaults to [`RuntimeEnvironment::current`].
    pub fn set_environment(&mut self, environment: RuntimeEnvironment) -> &mut Self {
        self.environment = Some(environment);
        self
    }

    /// Creates the reporter.
    pub fn build(&self) -> ResultReporter {
        let mut styles = Styles::default();
        if self.should_colorize {
            styles.colorize();
        }
        ResultReporter {
            styles,
            show_failures: self.show_failures,
            show_not_run: self.show_not_run,
            banner: self.banner.clone().unwrap_or_default(),
            environment: self
                .environment
                .clone()
                .unwrap_or_else(RuntimeEnvironment::current),
        }
    }
}

/// Writes textual reports.
#[derive(Clone, Debug)]
pub struct ResultReporter {
    styles: Styles,
    show_failures: bool,
    show_not_run: bool,
    banner: Banner,
    environment: RuntimeEnvironment,
}

impl ResultReporter {
    /// Writes the program name, version and copyright.
    pub fn write_header(&self, writer: &mut dyn WriteStr) -> io::Result<()> {
        writeln!(
            writer,
            "{} {} ({})",
            "touchrun".style(self.styles.heading),
            self.banner.version,
            self.banner.build,
        )?;
        writeln!(writer, "{}", self.banner.copyright)?;
        writeln!(writer)
    }

    /// Writes a description of the platform.
    pub fn write_runtime_environment(&self, writer: &mut dyn WriteStr) -> io::Result<()> {
        writeln!(writer, "{}", "Runtime Environment -".style(self.styles.heading))?;
        writeln!(writer, "   OS Version: {}", self.environment.os)?;
        writeln!(writer, "         Arch: {}", self.environment.arch)?;
        writeln!(writer)
    }

    /// Writes the summary of a finished run, followed by the enabled lists.
    pub fn write_report(
        &self,
        outcome: &Arc<TestOutcome>,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        self.write_summary(outcome, writer)?;
        if self.show_failures {
            self.write_failures(outcome, writer)?;
        }
        if self.show_not_run {
            self.write_not_run(outcome, writer)?;
        }
        writer.write_str_flush()
    }

    fn write_summary(&self, outcome: &TestOutcome, writer: &mut dyn WriteStr) -> io::Result<()> {
        let styles = &self.styles;
        let overall = outcome.overall_state();
        let counts = outcome.counts();

        writeln!(writer, "{}", "Test Run Summary".style(styles.heading))?;
        writeln!(
            writer,
            "  Overall result: {}",
            overall.style(styles.for_status(overall.status)),
        )?;
        writeln!(
            writer,
            "  Test Count: {}, Passed: {}, Failed: {}, Warnings: {}, Inconclusive: {}, Skipped: {}",
            counts.total().style(styles.count),
            counts.passed.style(styles.count),
            counts.failed.style(styles.count),
            counts.warnings.style(styles.count),
            counts.inconclusive.style(styles.count),
            counts.skipped.style(styles.count),
        )?;
        writeln!(
            writer,
            "  Duration: {:.3} seconds",
            outcome.duration().as_secs_f64()
        )?;
        writeln!(writer)
    }

    fn write_failures(
        &self,
        outcome: &Arc<TestOutcome>,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        // Only outcomes that failed or warned themselves are listed. A suite that is failing only
        // because of a child shows up through that child.
        let failures = outcome
            .depth_first()
            .map(|(_, outcome)| outcome)
            .filter(|outcome| {
                matches!(
                    outcome.state().status,
                    TestStatus::Failed | TestStatus::Warning
                )
            });
        self.write_list("Errors, Failures and Warnings", failures, true, writer)
    }

    fn write_not_run(
        &self,
        outcome: &Arc<TestOutcome>,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let not_run = outcome
            .depth_first()
            .map(|(_, outcome)| outcome)
            .filter(|outcome| {
                !outcome.has_children() && outcome.state().status == TestStatus::Skipped
            });
        self.write_list("Tests Not Run", not_run, false, writer)
    }

    fn write_list<'a>(
        &self,
        heading: &str,
        outcomes: impl Iterator<Item = &'a Arc<TestOutcome>>,
        with_stack_trace: bool,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let mut outcomes = outcomes.peekable();
        if outcomes.peek().is_none() {
            return Ok(());
        }

        writeln!(writer, "{}", heading.style(self.styles.heading))?;
        writeln!(writer)?;
        for (index, outcome) in outcomes.enumerate() {
            let state = outcome.state();
            writeln!(
                writer,
                "{}) {} : {}",
                index + 1,
                state.style(self.styles.for_status(state.status)),
                outcome.test().full_name(),
            )?;
            if let Some(message) = outcome.message() {
                write_indented(writer, INDENT, message)?;
            }
            if with_stack_trace && let Some(stack_trace) = outcome.stack_trace() {
                write_indented(writer, INDENT, stack_trace)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
struct Styles {
    heading: Style,
    count: Style,
    pass: Style,
    fail: Style,
    warning: Style,
    skip: Style,
    inconclusive: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.heading = Style::new().bold();
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.warning = Style::new().yellow().bold();
        self.skip = Style::new().yellow();
        self.inconclusive = Style::new().cyan();
    }

    fn for_status(&self, status: TestStatus) -> Style {
        match status {
            TestStatus::Passed => self.pass,
            TestStatus::Skipped => self.skip,
            TestStatus::Inconclusive => self.inconclusive,
            TestStatus::Warning => self.warning,
            TestStatus::Failed => self.fail,
        }
    }
}
