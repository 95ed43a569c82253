mod dtpp;
mod error;
mod loader;
mod merge;
mod metrics;
mod model;
mod output;
mod pipeline;
mod settings;
mod utils;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use pipeline::RunOptions;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "airport_json",
    about = "Build the per-airport JSON lookup from FAA NASR tables and d-TPP approach plates"
)]
struct Cli {
    /// Settings file (TOML). Defaults to ./airport_json.toml when present.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Skip cycle discovery and the metafile download
    #[arg(long)]
    offline: bool,
    /// Do not write the compact JSON artifact
    #[arg(long)]
    no_mini: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    info!(settings_loaded = ?settings, msg = "Starting airport build");

    let report = pipeline::run(
        &settings,
        &RunOptions {
            offline: cli.offline,
            no_mini: cli.no_mini,
        },
    )?;

    println!();
    report.tracker.print();
    println!(
        "\nSaved {} airports ({} with approach plates, {} without), cycle {}",
        report.merged.airports.len(),
        report.merged.with_approaches,
        report.merged.without_approaches,
        report.cycle,
    );
    println!("  {}", report.written.pretty.display());
    if let Some(mini) = &report.written.mini {
        println!("  {}", mini.display());
    }
    println!("  {}", report.written.cycle.display());
    println!("\nDone in {}", utils::format_duration(t0.elapsed()));
    Ok(())
}
