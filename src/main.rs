use anyhow::Result;
use clap::Parser;
use fibmark::cli::{Cli, Command};
use fibmark::{csv_output::CsvSink, fibonacci, runner, subject::FIBONACCI};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE level
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    match &args.command {
        Command::Compute { n, variant } => {
            let value = fibonacci::fibonacci(*n, variant, None)?;
            println!("{}", value);
        }
        Command::Bench { max_n, .. } => {
            if *max_n > fibonacci::MAX_N + 1 {
                anyhow::bail!(
                    "Invalid value for --max-n: {} (fibonacci(n) overflows 128 bits above n = {})",
                    max_n,
                    fibonacci::MAX_N
                );
            }
            let config = args.command.bench_config().unwrap_or_default();
            let summary = runner::run_benchmarks(&config)?;
            println!("{} rows -> {}", summary.rows, summary.path.display());
        }
        Command::Reset { output_dir } => {
            let path = CsvSink::new(output_dir).reset(FIBONACCI.name)?;
            println!("reset {}", path.display());
        }
    }

    Ok(())
}
