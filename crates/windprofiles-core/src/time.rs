use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use polars::prelude::*;
use tracing::debug;

use crate::config::Frequency;
use crate::error::{Result, TimeSeriesError};

/// Name of the index column in every frame a `TimeSeries` hands out.
pub const TIME_COLUMN: &str = "time";

/// Tried in order when no explicit datetime format is configured.
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

pub fn parse_naive(value: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let value = value.trim();
    match format {
        Some(format) => NaiveDateTime::parse_from_str(value, format)
            .ok()
            .or_else(|| midnight(NaiveDate::parse_from_str(value, format).ok())),
        None => DEFAULT_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|format| midnight(NaiveDate::parse_from_str(value, format).ok()))
            }),
    }
}

fn midnight(date: Option<NaiveDate>) -> Option<NaiveDateTime> {
    date.and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Interprets a wall-clock time in `tz`. Times repeated by a backward DST
/// shift resolve to the earlier instant; times skipped by a forward shift
/// do not exist and yield `None`.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => Some(first.min(second).with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Microseconds since the epoch for one raw timestamp string. Strings that
/// carry their own offset (RFC 3339) are taken as absolute instants.
fn parse_instant(value: &str, format: Option<&str>, tz: Tz) -> Option<i64> {
    if format.is_none() {
        if let Ok(absolute) = DateTime::parse_from_rfc3339(value.trim()) {
            return Some(absolute.timestamp_micros());
        }
    }
    parse_naive(value, format)
        .and_then(|naive| localize(tz, naive))
        .map(|utc| utc.timestamp_micros())
}

fn invalid(column: &str, row: usize, value: impl Into<String>) -> TimeSeriesError {
    TimeSeriesError::InvalidTimestamp {
        column: column.to_string(),
        row,
        value: value.into(),
    }
}

/// Parses a timestamp column into UTC microseconds.
///
/// String columns go through `format` (or the default list) and are
/// localized in `tz`. Datetime columns that already carry a zone are
/// absolute; naive datetime and date columns are wall-clock times in `tz`.
pub fn parse_time_column(column: &Column, format: Option<&str>, tz: Tz) -> Result<Vec<i64>> {
    let name = column.name().to_string();

    match column.dtype() {
        DataType::String => {
            let values = column.as_materialized_series().str()?;
            values
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let raw = value.ok_or_else(|| invalid(&name, row, "null"))?;
                    parse_instant(raw, format, tz).ok_or_else(|| invalid(&name, row, raw))
                })
                .collect()
        }
        DataType::Datetime(_, zone) => {
            let aware = zone.is_some();
            let micros = column
                .cast(&DataType::Datetime(TimeUnit::Microseconds, zone.clone()))?
                .cast(&DataType::Int64)?;
            physical_to_utc(&name, &micros, aware, tz)
        }
        DataType::Date => {
            let micros = column
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
                .cast(&DataType::Int64)?;
            physical_to_utc(&name, &micros, false, tz)
        }
        other => Err(TimeSeriesError::UnsupportedColumnType {
            column: name,
            dtype: other.to_string(),
        }),
    }
}

fn physical_to_utc(name: &str, micros: &Column, aware: bool, tz: Tz) -> Result<Vec<i64>> {
    let values = micros.as_materialized_series().i64()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.ok_or_else(|| invalid(name, row, "null"))?;
            if aware {
                return Ok(value);
            }
            DateTime::from_timestamp_micros(value)
                .and_then(|naive| localize(tz, naive.naive_utc()))
                .map(|utc| utc.timestamp_micros())
                .ok_or_else(|| invalid(name, row, value.to_string()))
        })
        .collect()
}

/// `len` evenly spaced instants starting at the wall-clock time `start` in `tz`.
/// Steps are taken in absolute time, so the index stays uniform across DST
/// changes.
pub fn generate_index(
    start: NaiveDateTime,
    frequency: Frequency,
    tz: Tz,
    len: usize,
) -> Result<Vec<i64>> {
    let origin = localize(tz, start)
        .ok_or_else(|| TimeSeriesError::InvalidStartTime(format!("{start} does not exist in {tz}")))?;
    let step = frequency
        .step()
        .num_microseconds()
        .ok_or_else(|| TimeSeriesError::InvalidFrequency {
            value: frequency.to_string(),
            reason: "step does not fit in microseconds".to_string(),
        })?;

    debug!(%origin, step_us = step, rows = len, "generating evenly spaced time index");

    let origin = origin.timestamp_micros();
    (0..len as i64)
        .map(|i| {
            step.checked_mul(i)
                .and_then(|offset| origin.checked_add(offset))
                .ok_or_else(|| TimeSeriesError::InvalidFrequency {
                    value: frequency.to_string(),
                    reason: format!("index overflows at row {i}"),
                })
        })
        .collect()
}

/// A UTC datetime series holding `micros`.
pub fn utc_series(name: &str, micros: &[i64]) -> Result<Series> {
    let series = Series::new(name.into(), micros.to_vec()).cast(&DataType::Datetime(
        TimeUnit::Microseconds,
        Some(polars::prelude::TimeZone::UTC),
    ))?;
    Ok(series)
}

/// The same instants as `utc_series`, labelled with `tz` so that formatting
/// and CSV output render local wall time with its offset.
pub fn zoned_series(name: &str, micros: &[i64], tz: Tz) -> Result<Series> {
    let series = Series::new(name.into(), micros.to_vec()).cast(&DataType::Datetime(
        TimeUnit::Microseconds,
        Some(polars::prelude::TimeZone::from_chrono(&tz)),
    ))?;
    Ok(series)
}
