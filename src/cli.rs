//! CLI argument parsing for fibmark

use crate::csv_output::DEFAULT_OUTPUT_DIR;
use crate::runner::BenchConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fibmark")]
#[command(version)]
#[command(about = "Fibonacci benchmarks with per-call timing and peak memory", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute a single Fibonacci number
    Compute {
        /// Index of the Fibonacci number
        n: u64,

        /// Computation strategy (recursive or iterative)
        #[arg(long, default_value = "recursive")]
        variant: String,
    },

    /// Run a benchmark series and append rows to the CSV file
    Bench {
        /// Benchmark n in 0..MAX_N
        #[arg(long = "max-n", value_name = "MAX_N", default_value = "40")]
        max_n: u64,

        /// Variant to benchmark; repeat for several (default: iterative, recursive)
        #[arg(long = "variant", value_name = "VARIANT")]
        variants: Vec<String>,

        /// Directory holding the benchmark CSV files
        #[arg(long = "output-dir", value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Truncate the CSV file before recording
        #[arg(long)]
        reset: bool,
    },

    /// Truncate the fibonacci benchmark file
    Reset {
        /// Directory holding the benchmark CSV files
        #[arg(long = "output-dir", value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

impl Command {
    /// Series settings for the `bench` subcommand
    pub fn bench_config(&self) -> Option<BenchConfig> {
        match self {
            Command::Bench {
                max_n,
                variants,
                output_dir,
                reset,
            } => {
                let mut config = BenchConfig {
                    output_dir: output_dir.clone(),
                    max_n: *max_n,
                    reset: *reset,
                    ..BenchConfig::default()
                };
                if !variants.is_empty() {
                    config.variants = variants.clone();
                }
                Some(config)
            }
            _ => None,
        }
    }
}
