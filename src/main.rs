//! snapprof CLI
//!
//! Records raw stack snapshots and reports on them as flat tables, call
//! trees, flamegraphs and JSON.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use std::time::Duration;

use snapprof::commands::{
    execute_export, execute_flamegraph, execute_flat, execute_record, execute_tree,
    validate_record_args, validate_snapshot_file, RecordArgs, ReportArgs,
};
use snapprof::sampler::TimeMode;
use snapprof::utils::config::{DEFAULT_CAPACITY, DEFAULT_WIDTH};

/// snapprof - sampling profiler with flat and call-tree reports
#[derive(Parser, Debug)]
#[command(name = "snapprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by the reporting commands
#[derive(Args, Debug)]
struct InputOptions {
    /// Snapshot JSON written by `record`
    #[arg(short, long, default_value = "snapshot.json")]
    input: PathBuf,

    /// Keep frames without source information
    #[arg(long)]
    include_native: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sample a built-in workload and write a snapshot
    Record {
        /// Output path for the JSON snapshot
        #[arg(short, long, default_value = "snapshot.json")]
        output: PathBuf,

        /// How long to run the workload, in milliseconds
        #[arg(long, default_value = "1000")]
        duration_ms: u64,

        /// Raw buffer entries
        #[arg(long, env = "SNAPPROF_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,

        /// Sampling interval in microseconds
        #[arg(long, env = "SNAPPROF_INTERVAL_US", default_value = "1000")]
        interval_us: u64,

        /// Clock driving the sampler: cpu or wall
        #[arg(long, default_value = "cpu")]
        time_mode: TimeMode,

        /// Replay generated stacks instead of sampling with signals
        #[arg(long)]
        synthetic: bool,

        /// Print the flat report after recording
        #[arg(long)]
        flat: bool,

        /// Print the tree report after recording
        #[arg(long)]
        tree: bool,

        /// Report width in columns
        #[arg(long, env = "COLUMNS", default_value_t = DEFAULT_WIDTH)]
        width: usize,
    },

    /// Print the flat report of a snapshot
    Flat {
        #[command(flatten)]
        input: InputOptions,

        /// One row per frame id instead of per (file, function, line)
        #[arg(long)]
        no_combine: bool,

        /// Report width in columns
        #[arg(long, env = "COLUMNS", default_value_t = DEFAULT_WIDTH)]
        width: usize,
    },

    /// Print the call tree of a snapshot
    Tree {
        #[command(flatten)]
        input: InputOptions,

        /// Group nodes by frame id instead of (file, function, line)
        #[arg(long)]
        no_merge_by_symbol: bool,

        /// Report width in columns
        #[arg(long, env = "COLUMNS", default_value_t = DEFAULT_WIDTH)]
        width: usize,
    },

    /// Render a snapshot as an SVG flamegraph
    Flamegraph {
        #[command(flatten)]
        input: InputOptions,

        /// Output path for the SVG
        #[arg(short, long, default_value = "flamegraph.svg")]
        output: PathBuf,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,
    },

    /// Write flat and tree reports of a snapshot as JSON
    Export {
        #[command(flatten)]
        input: InputOptions,

        /// Output path for the report JSON
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,
    },

    /// Validate a snapshot JSON file
    Validate {
        /// Path to snapshot JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
}

impl InputOptions {
    fn into_report_args(self, width: usize) -> ReportArgs {
        ReportArgs {
            input: self.input,
            include_native: self.include_native,
            width,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Record {
            output,
            duration_ms,
            capacity,
            interval_us,
            time_mode,
            synthetic,
            flat,
            tree,
            width,
        } => {
            let args = RecordArgs {
                output,
                duration: Duration::from_millis(duration_ms),
                capacity,
                interval: Duration::from_micros(interval_us),
                time_mode,
                synthetic,
                print_flat: flat,
                print_tree: tree,
                width,
            };

            // Validate args first
            validate_record_args(&args)?;

            execute_record(args)?;
        }

        Commands::Flat {
            input,
            no_combine,
            width,
        } => {
            let args = ReportArgs {
                combine: !no_combine,
                ..input.into_report_args(width)
            };
            execute_flat(&args)?;
        }

        Commands::Tree {
            input,
            no_merge_by_symbol,
            width,
        } => {
            let args = ReportArgs {
                merge_by_symbol: !no_merge_by_symbol,
                ..input.into_report_args(width)
            };
            execute_tree(&args)?;
        }

        Commands::Flamegraph {
            input,
            output,
            title,
        } => {
            let args = input.into_report_args(DEFAULT_WIDTH);
            execute_flamegraph(&args, &output, title.as_deref())?;
        }

        Commands::Export { input, output } => {
            let args = input.into_report_args(DEFAULT_WIDTH);
            execute_export(&args, &output)?;
        }

        Commands::Validate { input } => {
            validate_snapshot_file(&input)?;
        }
    }

    Ok(())
}
