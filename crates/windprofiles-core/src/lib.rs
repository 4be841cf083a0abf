//! Ingestion of loosely named meteorological tables into unit-consistent,
//! time-indexed series.

pub mod config;
pub mod error;
pub mod time;
pub mod timeseries;

pub use config::{Frequency, GeneratedIndex, IngestConfig};
pub use error::{Result, TimeSeriesError};
pub use time::TIME_COLUMN;
pub use timeseries::{resolve_column, BoundColumn, ColumnBinding, TimeSeries, UnitView};
pub use windprofiles_quantities as quantities;
