use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use polars::prelude::*;
use tracing::{debug, info, warn};
use windprofiles_quantities::{
    Dimension, QuantityError, Registry, Unit, UnitSpec, Variable, VariableId,
};

use crate::config::IngestConfig;
use crate::error::{Result, TimeSeriesError};
use crate::time::{generate_index, parse_time_column, utc_series, zoned_series, TIME_COLUMN};

/// What a raw column name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnBinding {
    /// No variable answers to this name; the column is dropped.
    Unmapped,
    /// The designated time variable.
    Timestamp,
    Measurement(VariableId),
}

pub fn resolve_column(registry: &Registry, column: &str) -> ColumnBinding {
    match registry.variable(column) {
        None => ColumnBinding::Unmapped,
        Some(variable) if registry.is_time_variable(variable.id()) => ColumnBinding::Timestamp,
        Some(variable) => ColumnBinding::Measurement(variable.id()),
    }
}

/// A measurement column bound to a variable.
#[derive(Debug, Clone)]
pub struct BoundColumn {
    name: String,
    variable: VariableId,
    original: Unit,
    declared: Option<UnitSpec>,
}

impl BoundColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variable(&self) -> VariableId {
        self.variable
    }

    /// The unit the raw values arrived in.
    pub fn original_unit(&self) -> &Unit {
        &self.original
    }

    /// The declaration that produced `original_unit`, absent when the column
    /// was assumed to be canonical.
    pub fn declared(&self) -> Option<&UnitSpec> {
        self.declared.as_ref()
    }
}

/// Which units a derived frame should carry.
#[derive(Debug, Clone)]
pub enum UnitView {
    Canonical,
    Original,
    /// Keys are column names or variable aliases. Columns not mentioned stay
    /// canonical.
    Custom(HashMap<String, UnitSpec>),
}

/// Time-indexed measurements, stored in each variable's canonical unit.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    registry: Arc<Registry>,
    data: DataFrame,
    index: Vec<i64>,
    time_zone: Tz,
    columns: Vec<BoundColumn>,
    warnings: Vec<String>,
}

impl TimeSeries {
    /// Binds each column of `raw` to a variable, converts measurements to
    /// canonical units and builds the time index.
    ///
    /// Unmapped columns are dropped with a warning. Every other failure
    /// aborts the whole ingestion.
    pub fn ingest(
        registry: &Arc<Registry>,
        raw: &DataFrame,
        config: &IngestConfig,
    ) -> Result<Self> {
        config.validate_units()?;
        let tz = config.time_zone();
        let mut warnings = Vec::new();
        let mut columns: Vec<BoundColumn> = Vec::new();
        let mut converted: Vec<Column> = Vec::new();
        let mut explicit_index: Option<(String, Vec<i64>)> = None;

        for column in raw.get_columns() {
            let name = column.name().to_string();

            match resolve_column(registry, &name) {
                ColumnBinding::Unmapped => {
                    warn!(column = %name, "no matching variable, dropping column");
                    warnings.push(format!("Dropped column {name} (no matching variable found)"));
                }
                ColumnBinding::Timestamp => {
                    if let Some((existing, _)) = &explicit_index {
                        return Err(TimeSeriesError::AmbiguousBinding {
                            column: name,
                            existing: existing.clone(),
                            variable: time_variable_name(registry),
                        });
                    }
                    let index = parse_time_column(column, config.datetime_format(), tz)?;
                    debug!(column = %name, rows = index.len(), "parsed explicit time index");
                    explicit_index = Some((name, index));
                }
                ColumnBinding::Measurement(id) => {
                    let variable = variable_by_id(registry, id)?;
                    if let Some(existing) = columns.iter().find(|bound| bound.variable == id) {
                        return Err(TimeSeriesError::AmbiguousBinding {
                            column: name,
                            existing: existing.name.clone(),
                            variable: variable.name().to_string(),
                        });
                    }
                    let dimension = dimension_of(registry, variable)?;

                    let (declared, original) = match config.unit_for(&name) {
                        Some(spec) => {
                            let unit = resolve_unit(registry, dimension, &name, spec)?;
                            (Some(spec.clone()), unit)
                        }
                        None if config.assume_canonical_units() => {
                            let unit = dimension.default_unit().clone();
                            warn!(column = %name, unit = %unit, "no unit declared, assuming canonical");
                            warnings.push(format!(
                                "Assumed canonical unit {unit} for column {name} (no unit declared)"
                            ));
                            (None, unit)
                        }
                        None => {
                            return Err(TimeSeriesError::MissingUnit {
                                column: name,
                                variable: variable.name().to_string(),
                            })
                        }
                    };

                    let values = numeric_values(column, &mut warnings)?;
                    let canonical: Vec<Option<f64>> = values
                        .into_iter()
                        .map(|value| value.map(|v| original.to_default(v)))
                        .collect();

                    debug!(
                        column = %name,
                        variable = variable.name(),
                        from = original.name(),
                        to = dimension.default_unit().name(),
                        "bound column"
                    );
                    converted.push(Series::new(name.as_str().into(), canonical).into());
                    columns.push(BoundColumn {
                        name,
                        variable: id,
                        original,
                        declared,
                    });
                }
            }
        }

        let index = match (explicit_index, config.generated_index()) {
            (Some((column, index)), generated) => {
                if generated.is_some() {
                    debug!(column = %column, "explicit time column takes precedence over start_time/frequency");
                }
                index
            }
            (None, Some(generated)) => {
                generate_index(generated.start, generated.frequency, tz, raw.height())?
            }
            (None, None) => return Err(TimeSeriesError::MissingTimeConfiguration),
        };

        let mut frame_columns: Vec<Column> = Vec::with_capacity(converted.len() + 1);
        frame_columns.push(utc_series(TIME_COLUMN, &index)?.into());
        frame_columns.extend(converted);
        let mut data = DataFrame::new(frame_columns)?;
        let mut index = index;

        if config.drop_duplicate_timestamps() {
            (data, index) = sort_and_deduplicate(data, index, &mut warnings)?;
        }

        info!(
            rows = data.height(),
            columns = columns.len(),
            warnings = warnings.len(),
            "ingested time series"
        );

        Ok(Self {
            registry: Arc::clone(registry),
            data,
            index,
            time_zone: tz,
            columns,
            warnings,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// The same data presented in another zone. Instants are unchanged; the
    /// frames handed out by `view` carry the new zone on their time column.
    pub fn with_time_zone(&self, tz: Tz) -> Self {
        let mut series = self.clone();
        series.time_zone = tz;
        series
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn bindings(&self) -> &[BoundColumn] {
        &self.columns
    }

    pub fn binding(&self, column: &str) -> Option<&BoundColumn> {
        self.columns.iter().find(|bound| bound.name == column)
    }

    /// Canonical unit per column, in column order.
    pub fn canonical_units(&self) -> Result<Vec<(&str, &Unit)>> {
        self.columns
            .iter()
            .map(|bound| {
                let dimension = self.dimension_for(bound)?;
                Ok((bound.name.as_str(), dimension.default_unit()))
            })
            .collect()
    }

    pub fn original_units(&self) -> Vec<(&str, &Unit)> {
        self.columns
            .iter()
            .map(|bound| (bound.name.as_str(), &bound.original))
            .collect()
    }

    pub fn index_micros(&self) -> &[i64] {
        &self.index
    }

    pub fn index(&self) -> Vec<DateTime<Utc>> {
        self.index
            .iter()
            .filter_map(|micros| DateTime::from_timestamp_micros(*micros))
            .collect()
    }

    pub fn local_index(&self) -> Vec<DateTime<Tz>> {
        self.index()
            .into_iter()
            .map(|utc| utc.with_timezone(&self.time_zone))
            .collect()
    }

    /// The stored frame, every measurement in its canonical unit and the
    /// index in UTC. `view(&UnitView::Canonical)` is the same data in the
    /// display zone.
    pub fn canonical(&self) -> &DataFrame {
        &self.data
    }

    /// A copy of the frame with each column back in its declared unit.
    pub fn original(&self) -> Result<DataFrame> {
        self.derive(|bound| Ok(Some(bound.original.clone())))
    }

    pub fn view(&self, view: &UnitView) -> Result<DataFrame> {
        match view {
            UnitView::Canonical => self.derive(|_| Ok(None)),
            UnitView::Original => self.original(),
            UnitView::Custom(units) => self.in_units(units),
        }
    }

    /// A copy of the frame with the requested columns converted. Each unit
    /// must belong to the dimension of the column's variable.
    pub fn in_units(&self, units: &HashMap<String, UnitSpec>) -> Result<DataFrame> {
        let mut keys: Vec<&String> = units.keys().collect();
        keys.sort();

        let mut targets: HashMap<&str, (&str, &UnitSpec)> = HashMap::new();
        for key in keys {
            let spec = &units[key];
            let bound = self.column_for_key(key)?;
            match targets.get(bound.name.as_str()) {
                Some((first, existing)) if *existing != spec => {
                    return Err(TimeSeriesError::ConflictingViewUnits {
                        column: bound.name.clone(),
                        first: first.to_string(),
                        second: key.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    targets.insert(bound.name.as_str(), (key.as_str(), spec));
                }
            }
        }

        self.derive(|bound| match targets.get(bound.name.as_str()) {
            Some((_, spec)) => {
                let dimension = self.dimension_for(bound)?;
                resolve_unit(&self.registry, dimension, &bound.name, spec).map(Some)
            }
            None => Ok(None),
        })
    }

    /// The canonical column bound to the variable `alias` names.
    pub fn series(&self, alias: &str) -> Result<&Column> {
        let variable = self.registry.require_variable(alias)?;
        self.variable_series(variable)
    }

    pub fn variable_series(&self, variable: &Variable) -> Result<&Column> {
        let bound = self
            .columns
            .iter()
            .find(|bound| bound.variable == variable.id())
            .ok_or_else(|| TimeSeriesError::UnboundVariable(variable.name().to_string()))?;
        Ok(self.data.column(&bound.name)?)
    }

    /// Canonical values of the variable `alias` names.
    pub fn values(&self, alias: &str) -> Result<Vec<Option<f64>>> {
        let column = self.series(alias)?;
        Ok(column.as_materialized_series().f64()?.into_iter().collect())
    }

    fn column_for_key(&self, key: &str) -> Result<&BoundColumn> {
        if let Some(bound) = self.binding(key) {
            return Ok(bound);
        }
        self.registry
            .variable(key)
            .and_then(|variable| self.columns.iter().find(|bound| bound.variable == variable.id()))
            .ok_or_else(|| TimeSeriesError::UnknownColumn(key.to_string()))
    }

    fn dimension_for(&self, bound: &BoundColumn) -> Result<&Dimension> {
        let variable = variable_by_id(&self.registry, bound.variable)?;
        dimension_of(&self.registry, variable)
    }

    /// Copies the frame with the time column in the display zone, converting
    /// every column for which `target` names a unit out of canonical.
    fn derive<F>(&self, target: F) -> Result<DataFrame>
    where
        F: Fn(&BoundColumn) -> Result<Option<Unit>>,
    {
        let mut frame = self.data.clone();
        frame.with_column(zoned_series(TIME_COLUMN, &self.index, self.time_zone)?)?;
        for bound in &self.columns {
            let Some(unit) = target(bound)? else {
                continue;
            };
            let canonical = self.data.column(&bound.name)?.as_materialized_series().f64()?;
            let converted: Vec<Option<f64>> = canonical
                .into_iter()
                .map(|value| value.map(|v| unit.from_default(v)))
                .collect();
            frame.with_column(Series::new(bound.name.as_str().into(), converted))?;
        }
        Ok(frame)
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "TimeSeries: {} rows, {} columns, zone {}",
            self.height(),
            self.columns.len(),
            self.time_zone
        )?;
        write!(f, "{}", self.data)
    }
}

fn time_variable_name(registry: &Registry) -> String {
    registry
        .time_variable()
        .map(|variable| variable.name().to_string())
        .unwrap_or_else(|| TIME_COLUMN.to_string())
}

fn variable_by_id(registry: &Registry, id: VariableId) -> Result<&Variable> {
    registry
        .variable_by_id(id)
        .ok_or_else(|| QuantityError::UnknownVariable(format!("{id:?}")).into())
}

fn dimension_of<'r>(registry: &'r Registry, variable: &Variable) -> Result<&'r Dimension> {
    registry.dimension_of(variable).ok_or_else(|| {
        QuantityError::UnknownDimension(format!("{:?}", variable.dimension())).into()
    })
}

/// Resolves a declared or requested unit for `column`. A unit that exists
/// only in some other dimension is a mismatch; one that exists nowhere is
/// unsupported.
fn resolve_unit(
    registry: &Registry,
    dimension: &Dimension,
    column: &str,
    spec: &UnitSpec,
) -> Result<Unit> {
    match dimension.resolve(spec) {
        Ok(unit) => Ok(unit),
        Err(QuantityError::UnsupportedUnit { unit, .. }) => {
            if let Some(other) = registry.dimension_of_unit(&unit) {
                return Err(TimeSeriesError::DimensionMismatch {
                    column: column.to_string(),
                    unit,
                    expected: dimension.name().to_string(),
                    found: other.name().to_string(),
                });
            }
            Err(TimeSeriesError::UnsupportedUnit {
                column: column.to_string(),
                dimension: dimension.name().to_string(),
                unit,
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// Stable sort by time, then keep the first row of each run of equal
/// timestamps.
fn sort_and_deduplicate(
    data: DataFrame,
    index: Vec<i64>,
    warnings: &mut Vec<String>,
) -> Result<(DataFrame, Vec<i64>)> {
    let mut order: Vec<usize> = (0..index.len()).collect();
    order.sort_by_key(|&row| index[row]);

    let mut seen = HashSet::with_capacity(index.len());
    let kept: Vec<usize> = order
        .into_iter()
        .filter(|&row| seen.insert(index[row]))
        .collect();

    let dropped = index.len() - kept.len();
    let reordered = kept.windows(2).any(|pair| pair[0] > pair[1]);
    if dropped == 0 && !reordered {
        return Ok((data, index));
    }
    if reordered {
        debug!("sorted rows by timestamp");
    }
    if dropped > 0 {
        warn!(rows = dropped, "dropped rows with duplicate timestamps");
        warnings.push(format!("Dropped {dropped} rows with duplicate timestamps"));
    }

    let rows = kept
        .iter()
        .map(|&row| IdxSize::try_from(row))
        .collect::<std::result::Result<Vec<IdxSize>, _>>()
        .map_err(|_| PolarsError::ComputeError("row index exceeds polars index size".into()))?;
    let data = data.take(&IdxCa::from_vec("row".into(), rows))?;
    let index = kept.into_iter().map(|row| index[row]).collect();
    Ok((data, index))
}

/// Reads a measurement column as floats. Cells that cannot be read as
/// numbers become nulls and are reported.
fn numeric_values(column: &Column, warnings: &mut Vec<String>) -> Result<Vec<Option<f64>>> {
    let before = column.null_count();
    let cast = column.cast(&DataType::Float64)?;
    let coerced = cast.null_count().saturating_sub(before);
    if coerced > 0 {
        warn!(column = %column.name(), cells = coerced, "non-numeric cells replaced with nulls");
        warnings.push(format!(
            "Column {} had {coerced} non-numeric cells replaced with nulls",
            column.name()
        ));
    }
    Ok(cast.as_materialized_series().f64()?.into_iter().collect())
}
