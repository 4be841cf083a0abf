// crates/windprofiles-core/src/error.rs

use thiserror::Error;
use windprofiles_quantities::QuantityError;

#[derive(Error, Debug)]
pub enum TimeSeriesError {
    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Quantity(#[from] QuantityError),

    #[error("Ingestion config is invalid: {0}")]
    Config(#[from] toml::de::Error),

    #[error("column '{column}' could not be distinguished from '{existing}' (both resolve to {variable})")]
    AmbiguousBinding {
        column: String,
        existing: String,
        variable: String,
    },

    #[error("units for '{first}' and '{second}' are both declared under the same normalized key")]
    ConflictingUnitDeclarations { first: String, second: String },

    #[error("column '{column}' was requested in both '{first}' and '{second}' with different units")]
    ConflictingViewUnits {
        column: String,
        first: String,
        second: String,
    },

    #[error("no timestamp column was found and no start_time/frequency pair was configured")]
    MissingTimeConfiguration,

    #[error("no source unit declared for column '{column}' ({variable})")]
    MissingUnit { column: String, variable: String },

    #[error("unit '{unit}' is not registered for dimension {dimension} (column '{column}')")]
    UnsupportedUnit {
        column: String,
        dimension: String,
        unit: String,
    },

    #[error("unit '{unit}' belongs to dimension {found}, but column '{column}' is {expected}")]
    DimensionMismatch {
        column: String,
        unit: String,
        expected: String,
        found: String,
    },

    #[error("no column is bound to variable {0}")]
    UnboundVariable(String),

    #[error("no column named '{0}' in this time series")]
    UnknownColumn(String),

    #[error("column '{column}' row {row}: invalid timestamp '{value}'")]
    InvalidTimestamp {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unrecognized time zone '{0}'")]
    InvalidTimezone(String),

    #[error("invalid frequency '{value}': {reason}")]
    InvalidFrequency { value: String, reason: String },

    #[error("invalid start time '{0}'")]
    InvalidStartTime(String),

    #[error("{present} was configured without {missing}")]
    PartialTimeConfiguration {
        present: &'static str,
        missing: &'static str,
    },

    #[error("column '{column}' has type {dtype}, which cannot be used as a time index")]
    UnsupportedColumnType { column: String, dtype: String },
}

pub type Result<T> = std::result::Result<T, TimeSeriesError>;
