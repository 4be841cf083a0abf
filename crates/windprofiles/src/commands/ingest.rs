// crates/windprofiles/src/commands/ingest.rs

use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::SecondsFormat;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;
use windprofiles_core::config::parse_time_zone;
use windprofiles_core::{IngestConfig, TimeSeries, UnitView};
use windprofiles_quantities::{Registry, UnitSpec};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
pub enum ViewKind {
    #[default]
    Canonical,
    Original,
}

#[derive(clap::Args, Debug)]
pub struct IngestArgs {
    /// CSV file with a header row
    #[arg(short, long)]
    data: PathBuf,
    /// TOML ingestion config (timezone, units, time source)
    #[arg(short, long)]
    config: PathBuf,
    /// Units of the written table
    #[arg(long, value_enum, default_value_t = ViewKind::Canonical)]
    view: ViewKind,
    /// Convert one column to a specific unit, as COLUMN=UNIT. Repeatable;
    /// overrides --view for the named columns.
    #[arg(long = "unit", value_name = "COLUMN=UNIT", value_parser = parse_unit_override)]
    units: Vec<(String, String)>,
    /// Present the index in this zone instead of the configured one
    #[arg(long)]
    display_timezone: Option<String>,
    /// Write the table here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print a JSON summary of bindings and warnings instead of the table
    #[arg(long)]
    json: bool,
}

fn parse_unit_override(value: &str) -> std::result::Result<(String, String), String> {
    let (column, unit) = value
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=UNIT, got '{value}'"))?;
    if column.trim().is_empty() || unit.trim().is_empty() {
        return Err(format!("expected COLUMN=UNIT, got '{value}'"));
    }
    Ok((column.trim().to_string(), unit.trim().to_string()))
}

#[derive(Serialize)]
struct ColumnSummary<'a> {
    column: &'a str,
    variable: &'a str,
    canonical_unit: &'a str,
    original_unit: &'a str,
}

#[derive(Serialize)]
struct IngestSummary<'a> {
    rows: usize,
    time_zone: String,
    first_timestamp: Option<String>,
    last_timestamp: Option<String>,
    columns: Vec<ColumnSummary<'a>>,
    warnings: &'a [String],
}

pub fn handle_ingest_command(args: IngestArgs) -> Result<()> {
    let registry = Arc::new(Registry::standard().context("failed to build the unit registry")?);

    let config_text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config {}", args.config.display()))?;
    let config = IngestConfig::from_toml_str(&config_text)
        .with_context(|| format!("invalid config {}", args.config.display()))?;

    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(args.data.clone()))?
        .finish()
        .with_context(|| format!("failed to read {}", args.data.display()))?;
    info!(path = %args.data.display(), rows = raw.height(), columns = raw.width(), "read raw table");

    let mut series = TimeSeries::ingest(&registry, &raw, &config)?;
    if let Some(zone) = &args.display_timezone {
        series = series.with_time_zone(parse_time_zone(zone)?);
    }

    for warning in series.warnings() {
        eprintln!("WARNING: {warning}");
    }

    if args.json {
        return print_summary(&series, &registry);
    }

    let view = if args.units.is_empty() {
        match args.view {
            ViewKind::Canonical => UnitView::Canonical,
            ViewKind::Original => UnitView::Original,
        }
    } else {
        let overrides: HashMap<String, UnitSpec> = args
            .units
            .iter()
            .map(|(column, unit)| (column.clone(), UnitSpec::named(unit.as_str())))
            .collect();
        UnitView::Custom(overrides)
    };
    let mut frame = series.view(&view)?;

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut frame)?;
            info!(path = %path.display(), rows = frame.height(), "wrote table");
        }
        None => {
            let mut stdout = std::io::stdout();
            CsvWriter::new(&mut stdout)
                .include_header(true)
                .finish(&mut frame)?;
        }
    }

    Ok(())
}

fn print_summary(series: &TimeSeries, registry: &Registry) -> Result<()> {
    let canonical = series.canonical_units()?;
    let mut columns = Vec::with_capacity(canonical.len());
    for ((column, canonical_unit), bound) in canonical.into_iter().zip(series.bindings()) {
        let variable = registry
            .variable_by_id(bound.variable())
            .ok_or_else(|| anyhow!("column {column} is bound to an unknown variable"))?;
        columns.push(ColumnSummary {
            column,
            variable: variable.name(),
            canonical_unit: canonical_unit.name(),
            original_unit: bound.original_unit().name(),
        });
    }

    let local = series.local_index();
    let summary = IngestSummary {
        rows: series.height(),
        time_zone: series.time_zone().to_string(),
        first_timestamp: local
            .first()
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, false)),
        last_timestamp: local
            .last()
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, false)),
        columns,
        warnings: series.warnings(),
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
