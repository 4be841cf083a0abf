// crates/windprofiles/src/commands/units.rs

use anyhow::{Context, Result};
use comfy_table::Table;
use windprofiles_quantities::Registry;

#[derive(clap::Args, Debug)]
pub struct UnitsArgs {
    /// Only show this dimension (any alias)
    #[arg(long)]
    dimension: Option<String>,
    /// List variables and their aliases instead of units
    #[arg(long)]
    variables: bool,
}

pub fn handle_units_command(args: UnitsArgs) -> Result<()> {
    let registry = Registry::standard().context("failed to build the unit registry")?;

    let only = match &args.dimension {
        Some(alias) => Some(registry.require_dimension(alias)?.name().to_string()),
        None => None,
    };

    let mut table = Table::new();
    if args.variables {
        table.set_header(vec!["Variable", "Aliases", "Dimension", "Canonical unit"]);
        for variable in registry.variables() {
            let Some(dimension) = registry.dimension_of(variable) else {
                continue;
            };
            if only.as_deref().is_some_and(|name| name != dimension.name()) {
                continue;
            }
            table.add_row(vec![
                variable.name().to_string(),
                variable.aliases().join(", "),
                dimension.name().to_string(),
                dimension.default_unit().name().to_string(),
            ]);
        }
    } else {
        table.set_header(vec!["Dimension", "Unit", "Kind"]);
        for dimension in registry.dimensions() {
            if only.as_deref().is_some_and(|name| name != dimension.name()) {
                continue;
            }
            for (position, unit) in dimension.units().iter().enumerate() {
                let kind = match (position, unit.is_affine()) {
                    (0, _) => "default",
                    (_, true) => "affine",
                    (_, false) => "custom",
                };
                table.add_row(vec![
                    dimension.name().to_string(),
                    unit.name().to_string(),
                    kind.to_string(),
                ]);
            }
        }
    }

    println!("{table}");
    Ok(())
}
