use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wordfreq_cli::{AnalyzeArgs, BenchArgs, OutputFormat, Settings, analyze_file, bench_file, write_rows};

#[derive(Parser)]
#[command(name = "wordfreq")]
#[command(about = "Word frequency analysis with interchangeable concurrency strategies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count words in a document and print the most frequent ones
    Analyze(AnalyzeArgs),
    /// Run every strategy on a document and compare timings
    Bench(BenchArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Analyze(args) => {
            let settings = Settings::from_env(&args.flags);
            info!(
                "analyzing {} with {} ({} workers, min length {}, {} load)",
                args.path.display(),
                settings.strategy,
                settings.workers,
                settings.min_len,
                settings.load_mode
            );
            let report = analyze_file(
                &args.path,
                &settings,
                args.lemmas.as_deref(),
                &args.lookups,
            )?;
            if !report.complete {
                warn!("analysis stopped before every sentence was counted");
            }
            match args.format {
                OutputFormat::Text => report.write_text(&mut out)?,
                OutputFormat::Json => report.write_json(&mut out)?,
            }
        }
        Commands::Bench(args) => {
            let settings = Settings::from_env(&args.flags());
            let rows = bench_file(&args.path, &settings, args.rounds)?;
            write_rows(&rows, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr)
        .init();
}
