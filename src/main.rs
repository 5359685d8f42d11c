// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the issue-insight binary.
//!
//! Each subcommand runs one analysis. Values from an optional YAML
//! configuration are overridden by flags, and the merged result is passed to
//! the library as an explicit request. Report lines go to stdout; logs go to
//! stderr.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use issue_insight::{
    AnalysisConfig, AnalysisKind, AnalysisRequest, DataLoader, Error, GitHubLoader, IssueFilter,
    JsonFileLoader, MAX_TOP_LABELS, Plotter, RecordingPlotter, RunReport, SourceConfig, SvgPlotter,
    io_error, load_config, top_labels_in_range,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command line interface for issue analytics.
#[derive(Debug, Parser,)]
#[command(name = "issue-insight", version, about = "Summarize issue-tracker activity")]
struct Cli
{
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand,)]
/// Supported analyses.
enum Command
{
    /// Close times and label breakdown, optionally narrowed by creator or label.
    Labels(LabelsArgs,),
    /// Issues opened and closed per month.
    Monthly(SourceArgs,),
    /// Overall and per-label average time to close.
    #[command(name = "close-time")]
    CloseTime(SourceArgs,),
    /// State split, top labels and time to resolution.
    Overall(OverallArgs,),
}

/// Flags shared by every analysis.
#[derive(Debug, Args, Default, Clone,)]
struct SourceArgs
{
    /// Path to a YAML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// JSON export of issue records.
    #[arg(long = "input", value_name = "PATH", conflicts_with = "github")]
    input: Option<PathBuf,>,

    /// GitHub repository to fetch issues from.
    #[arg(long = "github", value_name = "OWNER/REPO")]
    github: Option<String,>,

    /// Personal access token for the GitHub API.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String,>,

    /// Only load issues opened by this user.
    #[arg(long = "user", value_name = "LOGIN")]
    user: Option<String,>,

    /// Directory that will receive SVG charts.
    #[arg(long = "charts", value_name = "DIR")]
    charts: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
struct LabelsArgs
{
    #[command(flatten)]
    source: SourceArgs,

    /// Keep only issues opened by this creator.
    #[arg(long = "creator", value_name = "LOGIN")]
    creator: Option<String,>,

    /// Keep only issues carrying this label.
    #[arg(long = "label", value_name = "LABEL")]
    label: Option<String,>,
}

#[derive(Debug, Args,)]
struct OverallArgs
{
    #[command(flatten)]
    source: SourceArgs,

    /// Number of labels in the top-labels chart.
    #[arg(long = "top", value_name = "N")]
    top: Option<usize,>,
}

/// Fully resolved invocation.
struct Invocation
{
    request:    AnalysisRequest,
    loader:     Box<dyn DataLoader,>,
    charts_dir: Option<PathBuf,>,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    let cli = Cli::parse();
    if let Err(error,) = init_tracing(cli.verbose,).and_then(|()| execute(cli, &mut io::stdout().lock(),),) {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Installs the stderr subscriber; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbosity: u8,) -> Result<(), Error,>
{
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbosity,),),)
        .map_err(|e| Error::validation(format!("invalid log filter: {e}"),),)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter,)
        .with_writer(io::stderr,)
        .with_target(false,)
        .try_init()
        .map_err(|e| Error::service(format!("failed to initialize logging: {e}"),),)
}

fn default_filter(verbosity: u8,) -> &'static str
{
    match verbosity {
        0 => "warn",
        1 => "issue_insight=info",
        2 => "issue_insight=debug",
        _ => "issue_insight=trace",
    }
}

/// Runs the parsed command and writes its report lines to `writer`.
///
/// # Errors
///
/// Propagates configuration, loading, analysis and output failures.
fn execute<W: Write,>(cli: Cli, writer: &mut W,) -> Result<(), Error,>
{
    let invocation = resolve(cli.command,)?;

    let report = match invocation.charts_dir.as_deref() {
        Some(directory,) => {
            let mut plotter = SvgPlotter::new(directory,);
            let report = analyze_with(&invocation, &mut plotter,)?;
            debug!("Wrote {} chart files to {}", plotter.written().len(), plotter.output_dir().display());
            report
        }
        None => analyze_with(&invocation, &mut RecordingPlotter::new(),)?,
    };

    write_report(writer, &report,)
}

fn analyze_with(invocation: &Invocation, plotter: &mut dyn Plotter,) -> Result<RunReport, Error,>
{
    issue_insight::run(invocation.loader.as_ref(), &invocation.request, plotter,)
}

/// Merges flags over the configuration file into an explicit invocation.
///
/// # Errors
///
/// Returns an [`Error`] when the configuration cannot be loaded, no issue
/// source is given, or a value is out of range.
fn resolve(command: Command,) -> Result<Invocation, Error,>
{
    let (kind, source, creator, label, top,) = match command {
        Command::Labels(args,) => (AnalysisKind::Labels, args.source, args.creator, args.label, None,),
        Command::Monthly(source,) => (AnalysisKind::Monthly, source, None, None, None,),
        Command::CloseTime(source,) => (AnalysisKind::CloseTime, source, None, None, None,),
        Command::Overall(args,) => (AnalysisKind::Overall, args.source, None, None, args.top,),
    };

    let config = match source.config.as_deref() {
        Some(path,) => load_config(path,)?,
        None => AnalysisConfig::default(),
    };

    let top_labels = match top {
        Some(count,) if !top_labels_in_range(count,) => {
            return Err(Error::validation(format!("--top must be between 1 and {MAX_TOP_LABELS}"),),);
        }
        Some(count,) => count,
        None => config.resolved_top_labels(),
    };

    let filter = match kind {
        AnalysisKind::Labels => IssueFilter {
            creator: creator.or(config.creator.clone(),),
            label:   label.or(config.label.clone(),),
        },
        _ => IssueFilter::default(),
    };

    let loader = build_loader(&source, config.source.as_ref(),)?;

    Ok(Invocation {
        request: AnalysisRequest {
            kind,
            user: source.user.or(config.user,),
            filter,
            top_labels,
        },
        loader,
        charts_dir: source.charts.or(config.charts_dir,),
    },)
}

fn build_loader(source: &SourceArgs, configured: Option<&SourceConfig,>,) -> Result<Box<dyn DataLoader,>, Error,>
{
    if let Some(path,) = source.input.as_ref() {
        return Ok(Box::new(JsonFileLoader::new(path,),),);
    }

    let github = match (source.github.as_deref(), configured,) {
        (Some(slug,), _,) => GitHubLoader::from_slug(slug,)?,
        (None, Some(SourceConfig::Json(path,),),) => {
            return Ok(Box::new(JsonFileLoader::new(path,),),);
        }
        (
            None,
            Some(SourceConfig::Github {
                owner,
                repository,
            },),
        ) => GitHubLoader::new(owner, repository,),
        (None, None,) => {
            return Err(Error::validation(
                "missing issue source: pass --input <PATH> or --github <OWNER/REPO>, or set \
                 source in --config",
            ),);
        }
    };

    Ok(match source.token.as_ref() {
        Some(token,) => Box::new(github.with_token(token,),),
        None => Box::new(github,),
    },)
}

fn write_report<W: Write,>(writer: &mut W, report: &RunReport,) -> Result<(), Error,>
{
    for line in &report.lines {
        writeln!(writer, "{line}").map_err(|source| io_error(Path::new("<stdout>",), source,),)?;
    }

    Ok((),)
}
