//! Verity - output verification for competitive-programming problems
//!
//! The `verity` command checks candidate outputs against a reference answer.
//!
//! ## Commands
//!
//! - `output`: Compare precomputed output files with a reference file
//! - `program`: Run candidate programs on an input file and compare their stdout
//!
//! Exit status is 0 when every candidate passes, 1 when any candidate fails,
//! and 2 when the call itself could not run (bad arguments, unreadable
//! reference, failing reference program).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{warn, Level};

use verity_compare::{
    Comparator, CompareResult, ContentSource, ExecutionSpec, FileInput, InputSource, PoolConfig,
};
use verity_core::{init_tracing, METRICS};

#[derive(Parser, Debug)]
#[command(name = "verity")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify program outputs against a reference answer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Grader used to compare outputs
    #[arg(long, global = true, env = "VERITY_GRADER", default_value = "FullText")]
    grader: String,

    /// Maximum number of candidates checked at once
    #[arg(long, global = true, env = "VERITY_WORKERS")]
    workers: Option<usize>,

    /// Check candidates one at a time, in order
    #[arg(long, global = true, conflicts_with = "workers")]
    sequential: bool,

    /// Report format written to stdout
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare output files with a reference file
    Output {
        /// Reference output file
        #[arg(long = "std")]
        standard: PathBuf,

        /// Candidate output files
        #[arg(required = true)]
        candidates: Vec<PathBuf>,
    },

    /// Run programs on an input file and compare their output
    Program {
        /// File fed to every program on stdin
        #[arg(long)]
        input: PathBuf,

        /// Reference output file
        #[arg(long = "std", conflicts_with = "std_program")]
        standard: Option<PathBuf>,

        /// Shell command producing the reference output
        #[arg(long)]
        std_program: Option<String>,

        /// Per-program time limit in seconds
        #[arg(long, value_parser = parse_timeout)]
        timeout: Option<Duration>,

        /// Candidate shell commands
        #[arg(required = true)]
        candidates: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json_logs, level);

    let outcome = run(cli).await;
    METRICS.flush();

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Run the selected command; `Ok(true)` when every candidate passed.
async fn run(cli: Cli) -> Result<bool> {
    let comparator = Comparator::new()
        .grader(cli.grader.as_str())
        .pool_config(pool_config(cli.sequential, cli.workers));

    if !comparator.registry().contains(&cli.grader) {
        warn!(
            grader = %cli.grader,
            known = ?comparator.registry().names(),
            "Unknown grader, every candidate will fail"
        );
    }

    let (mode, result) = match cli.command {
        Commands::Output {
            standard,
            candidates,
        } => ("output", cmd_output(&comparator, standard, candidates).await?),
        Commands::Program {
            input,
            standard,
            std_program,
            timeout,
            candidates,
        } => (
            "program",
            cmd_program(&comparator, input, standard, std_program, timeout, candidates).await?,
        ),
    };

    match cli.format {
        ReportFormat::Text => print!("{}", render_text(&result)),
        ReportFormat::Json => {
            let report = JsonReport {
                mode,
                grader: &cli.grader,
                result: &result,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(result.is_success())
}

fn pool_config(sequential: bool, workers: Option<usize>) -> PoolConfig {
    match (sequential, workers) {
        (true, _) => PoolConfig::sequential(),
        (false, Some(n)) => PoolConfig::parallel(n),
        (false, None) => PoolConfig::default(),
    }
}

async fn cmd_output(
    comparator: &Comparator,
    standard: PathBuf,
    candidates: Vec<PathBuf>,
) -> Result<CompareResult> {
    let candidates = candidates.into_iter().map(ContentSource::path).collect();
    comparator
        .output(Some(ContentSource::path(standard)), candidates)
        .await
        .context("Output comparison failed")
}

async fn cmd_program(
    comparator: &Comparator,
    input: PathBuf,
    standard: Option<PathBuf>,
    std_program: Option<String>,
    timeout: Option<Duration>,
    candidates: Vec<String>,
) -> Result<CompareResult> {
    if !input.is_file() {
        bail!("Input file not found: {}", input.display());
    }
    let input: Arc<dyn InputSource> = Arc::new(FileInput::new(input));

    let with_limit = |command: String| {
        let spec = ExecutionSpec::shell(command);
        match timeout {
            Some(limit) => spec.with_timeout(limit),
            None => spec,
        }
    };

    comparator
        .program(
            input,
            candidates.into_iter().map(&with_limit).collect(),
            standard.map(ContentSource::path),
            std_program.map(with_limit),
        )
        .await
        .context("Program comparison failed")
}

fn parse_timeout(raw: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", raw))?;
    if secs.is_nan() || secs <= 0.0 {
        return Err("timeout must be positive".to_string());
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    mode: &'a str,
    grader: &'a str,
    #[serde(flatten)]
    result: &'a CompareResult,
}

fn render_text(result: &CompareResult) -> String {
    let mut out = String::new();
    for label in &result.passed {
        out.push_str(&format!("PASS  {}\n", label));
    }
    for failure in &result.failed {
        out.push_str(&format!("FAIL  {}\n", failure));
    }
    out.push_str(&format!(
        "\n{} passed, {} failed ({} ms)\n",
        result.passed_count(),
        result.failed_count(),
        result.duration_ms
    ));
    out
}
