// crates/windprofiles/src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
use commands::ingest::{handle_ingest_command, IngestArgs};
use commands::units::{handle_units_command, UnitsArgs};

/// Loads loosely named meteorological tables into canonical units.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Ingests a CSV file and writes it back out in the requested units.
    Ingest(IngestArgs),
    /// Lists registered dimensions, units and variables.
    Units(UnitsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Ingest(args) => handle_ingest_command(args),
        Commands::Units(args) => handle_units_command(args),
    }
}
