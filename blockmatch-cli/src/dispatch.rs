// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::ExpectedError,
    output::{clap_styles, OutputContext, OutputOpts, OutputWriter, ResultStyles},
};
use blockmatch_metadata::{MatchEvent, ReconcileExitCode, TestReconciliationState, TestResult};
use blockmatch_reconciler::{
    config::{DefaultConfigWarnings, ReconcileConfig},
    input::{read_assertions, read_parsed_file},
    reconcile::Reconciler,
    results::SortedTestResults,
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::io::Write;
use tracing::{debug, info, warn};

/// Reconcile parsed test blocks with test runner results.
///
/// blockmatch reads the test blocks a parser found in a source file and the assertions a test
/// runner reported for that file, and works out which assertion belongs to which block.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style(), max_term_width = 100)]
pub struct BlockmatchApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(flatten)]
    config_opts: ConfigOpts,

    #[command(subcommand)]
    command: Command,
}

impl BlockmatchApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the exit code on success.
    pub fn exec(
        self,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        match self.command {
            Command::Reconcile(opts) => opts.exec(&self.config_opts, output, output_writer),
        }
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Config options")]
struct ConfigOpts {
    /// Config file [default: ROOT/.config/blockmatch.toml]
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Directory to look for the config file in
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    root: Utf8PathBuf,
}

impl ConfigOpts {
    fn make_config(&self) -> Result<ReconcileConfig, ExpectedError> {
        let config = ReconcileConfig::from_sources(
            &self.root,
            self.config_file.as_deref(),
            &mut DefaultConfigWarnings,
        )?;
        debug!("loaded config: {config:?}");
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match test blocks to runner assertions and print one result per block
    ///
    /// The source tree is the JSON produced by the test file parser. The assertion list is the
    /// JSON array of assertions the test runner reported for the same file.
    Reconcile(ReconcileOpts),
}

#[derive(Debug, Args)]
struct ReconcileOpts {
    /// Source tree produced by the parser (JSON)
    #[arg(long, short = 's', value_name = "PATH")]
    source: Utf8PathBuf,

    /// Assertions reported by the test runner (JSON)
    #[arg(long, short = 'a', value_name = "PATH")]
    assertions: Utf8PathBuf,

    /// Output format
    #[arg(
        short = 'T',
        long,
        value_enum,
        default_value_t,
        help_heading = "Output options",
        value_name = "FMT"
    )]
    message_format: MessageFormatOpts,

    /// Exit with a non-zero code if any test block could not be matched
    #[arg(long, help_heading = "Output options")]
    fail_on_unmatched: bool,
}

impl ReconcileOpts {
    fn exec(
        self,
        config_opts: &ConfigOpts,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        let config = config_opts.make_config()?;
        let reconciler = Reconciler::new(
            config.matcher_options(),
            output.verbose || config.diagnostics.verbose,
        );

        let parsed = read_parsed_file(&self.source)?;
        let assertions = read_assertions(&self.assertions)?;
        debug!(
            "read {} top-level blocks from `{}` and {} assertions from `{}`",
            parsed.root.len(),
            self.source,
            assertions.len(),
            self.assertions,
        );

        let results = reconciler.reconcile(&parsed, &assertions)?;

        let format = self.message_format.to_output_format(output.verbose);
        let mut writer = output_writer.stdout_writer();
        write_results(&results, format, &output.result_styles(), &mut writer)?;
        writer.flush().map_err(ExpectedError::write_results)?;

        let sorted = SortedTestResults::new(&results);
        let unmatched = sorted.unmatched().count();
        info!(
            "{} {}: {} passed, {} failed, {} skipped, {} unknown",
            sorted.total(),
            plural_tests(sorted.total()),
            sorted.success.len(),
            sorted.fail.len(),
            sorted.skip.len(),
            sorted.unknown.len(),
        );
        if unmatched > 0 {
            warn!(
                "{unmatched} {} in `{}` could not be matched",
                plural_tests(unmatched),
                parsed.file.as_deref().unwrap_or(&self.source),
            );
            if self.fail_on_unmatched {
                return Err(ExpectedError::UnmatchedTests { count: unmatched });
            }
        }

        Ok(ReconcileExitCode::OK)
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum MessageFormatOpts {
    #[default]
    Human,
    Json,
    JsonPretty,
}

impl MessageFormatOpts {
    fn to_output_format(self, verbose: bool) -> OutputFormat {
        match self {
            Self::Human => OutputFormat::Human { verbose },
            Self::Json => OutputFormat::Json { pretty: false },
            Self::JsonPretty => OutputFormat::Json { pretty: true },
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Human { verbose: bool },
    Json { pretty: bool },
}

fn write_results(
    results: &[TestResult],
    format: OutputFormat,
    styles: &ResultStyles,
    writer: &mut dyn Write,
) -> Result<(), ExpectedError> {
    match format {
        OutputFormat::Human { verbose } => {
            for result in results {
                write_human(result, verbose, styles, 0, writer)
                    .map_err(ExpectedError::write_results)?;
            }
        }
        OutputFormat::Json { pretty } => {
            TestResult::write_list_json(results, pretty, &mut *writer)
                .map_err(ExpectedError::serialize_results)?;
            writeln!(writer).map_err(ExpectedError::write_results)?;
        }
    }
    Ok(())
}

fn write_human(
    result: &TestResult,
    verbose: bool,
    styles: &ResultStyles,
    indent: usize,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    let status_style = match result.status {
        TestReconciliationState::KnownFail => styles.fail,
        TestReconciliationState::KnownSuccess => styles.pass,
        TestReconciliationState::KnownSkip
        | TestReconciliationState::KnownTodo => styles.skip,
        TestReconciliationState::Unknown => styles.unknown,
    };

    // Lines are shown 1-based, the way an editor displays them.
    write!(
        writer,
        "{:indent$}{:>7} {} {}",
        "",
        result.status.style(status_style),
        result.name,
        format!("[{}-{}]", result.start.line + 1, result.end.line + 1).style(styles.line),
    )?;
    if let Some(line) = result.line_number_of_error {
        write!(writer, " {}", format!("(error at {})", line + 1).style(styles.line))?;
    }
    writeln!(writer)?;

    if let Some(message) = result.terse_message.as_ref().or(result.short_message.as_ref()) {
        writeln!(writer, "{:indent$}        {}", "", message.style(styles.reason))?;
    }

    if verbose {
        writeln!(
            writer,
            "{:indent$}        {} {}",
            "",
            "source:".style(styles.reason),
            join_events(&result.source_history),
        )?;
        writeln!(
            writer,
            "{:indent$}        {} {}",
            "",
            "assertion:".style(styles.reason),
            join_events(&result.assertion_history),
        )?;
    }

    if !result.multi_results.is_empty() {
        writeln!(
            writer,
            "{:indent$}        {} more {}",
            "",
            result.multi_results.len().style(styles.count),
            if result.multi_results.len() == 1 {
                "invocation"
            } else {
                "invocations"
            },
        )?;
        for other in &result.multi_results {
            write_human(other, verbose, styles, indent + 8, writer)?;
        }
    }

    Ok(())
}

fn join_events(events: &[MatchEvent]) -> String {
    if events.is_empty() {
        return "(none)".to_owned();
    }
    let events: Vec<_> = events.iter().map(|event| event.as_str()).collect();
    events.join(", ")
}

fn plural_tests(count: usize) -> &'static str {
    if count == 1 {
        "test"
    } else {
        "tests"
    }
}
