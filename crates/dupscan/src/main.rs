//! dupscan CLI - find field values repeated across delimited-text files.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use dupscan::{
    cancel_on_interrupt, resolve_files, write_duplicates, Duplicate, ExitStatus, FileReport,
    ScanConfig, Scanner,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// JSON output for scan results.
#[derive(Serialize)]
struct JsonOutput {
    files: Vec<FileReport>,
    field_index: usize,
    total_values: u64,
    distinct_values: usize,
    duplicates: Vec<Duplicate>,
    status: ExitStatus,
    exit_code: u8,
    interrupted: bool,
    elapsed_secs: f64,
}

/// Find field values that occur more than once across delimited-text files.
///
/// Every file is scanned in parallel. The first row of each file is treated as
/// a header and skipped; one column of every other row is counted, and values
/// seen more than once are reported after the scan completes.
///
/// Exit status: 0 when every file was scanned (or there was nothing to do),
/// 1 when a file could not be opened, 2 when a file could not be decoded.
#[derive(Parser, Debug)]
#[command(name = "dupscan")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Comma-separated files to scan: 'file1,file2,file3'. Takes priority over --pattern.
    #[arg(long, value_name = "FILES")]
    files: Option<String>,

    /// Glob pattern selecting the files to scan, e.g. '*.csv'.
    #[arg(long, value_name = "PATTERN")]
    pattern: Option<String>,

    /// Zero-based index of the column to check for duplicates.
    #[arg(short = 'f', long, default_value = "1")]
    field: usize,

    /// Field delimiter (single ASCII character).
    #[arg(short = 'd', long, default_value = ",")]
    delimiter: char,

    /// Buffer between file readers and the counter (0 = hand-off).
    #[arg(long, default_value = "0")]
    channel_capacity: usize,

    /// Keep scanning the other files when one cannot be decoded.
    #[arg(long)]
    keep_going: bool,

    /// Output results as JSON.
    #[arg(long)]
    json: bool,

    /// Show a spinner while scanning.
    #[arg(long)]
    progress: bool,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Install the tracing subscriber.
///
/// Diagnostics go to stdout alongside the report, except in JSON mode where
/// stdout carries only the JSON document.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = match (json, verbose) {
        (true, false) => "warn",
        (_, true) => "debug",
        (false, false) => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(io::stdout().is_terminal())
            .try_init();
    }
}

/// Create a spinner for indeterminate progress.
fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Cli::parse();

    // Handle completions subcommand
    if let Some(Commands::Completions { shell }) = args.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "dupscan", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing(args.verbose, args.json);

    if !args.delimiter.is_ascii() {
        eprintln!("Error: delimiter must be a single ASCII character");
        return Ok(ExitCode::from(1));
    }

    let config = ScanConfig {
        field_index: args.field,
        delimiter: args.delimiter as u8,
        channel_capacity: args.channel_capacity,
        fail_fast: !args.keep_going,
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        return Ok(ExitCode::from(1));
    }

    let tasks = match resolve_files(args.files.as_deref(), args.pattern.as_deref()) {
        Ok(tasks) => tasks,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::from(1));
        }
    };

    if tasks.is_empty() {
        if !args.json {
            println!("no filenames or pattern given, exiting");
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !args.json {
        let names: Vec<String> = tasks
            .iter()
            .map(|t| t.path().display().to_string())
            .collect();
        println!("files to be checked for duplicates: {names:?}");
    }

    let scanner = Scanner::new(config);
    if let Err(e) = cancel_on_interrupt(scanner.cancel_signal()) {
        warn!(error = %e, "could not install interrupt handler");
    }

    let pb = if args.progress {
        Some(create_spinner(&format!("Scanning {} files...", tasks.len())))
    } else {
        None
    };

    let outcome = scanner.scan(&tasks)?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let duplicates = outcome.duplicates();

    if args.json {
        let mut duplicates = duplicates;
        duplicates.sort_by(|a, b| a.value.cmp(&b.value));
        let output = JsonOutput {
            field_index: args.field,
            total_values: outcome.frequencies.total(),
            distinct_values: outcome.frequencies.len(),
            duplicates,
            status: outcome.status,
            exit_code: outcome.status.code(),
            interrupted: outcome.cancelled
                && (args.keep_going || outcome.status != ExitStatus::DecodeFailure),
            elapsed_secs: outcome.elapsed_secs,
            files: outcome.files,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        write_duplicates(io::stdout().lock(), &duplicates)?;
        println!("done");
    }

    Ok(ExitCode::from(outcome.status.code()))
}
