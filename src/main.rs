use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fresh::parse_inventory;

#[derive(Parser, Debug)]
#[command(name = "fresh", version)]
#[command(about = "Counts how many ids fall inside at least one fresh range")]
struct Args {
    /// Path to the input file: ranges, a blank line, then ids
    #[arg(default_value = "input.txt")]
    input: PathBuf,
}

fn init_logger() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fresh=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger();

    info!("Reading {}...", args.input.display());

    let file = File::open(&args.input)
        .with_context(|| format!("unable to open {}", args.input.display()))?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("unable to read {}", args.input.display()))?;

    let inventory = parse_inventory(lines.into_iter())?;

    info!(
        "Parsed {} ranges and {} ids",
        inventory.num_ranges(),
        inventory.num_ids()
    );

    println!("fresh ids: {}", inventory.num_fresh());

    Ok(())
}
