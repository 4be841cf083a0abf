use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use chrono_tz::Tz;
use serde::Deserialize;
use windprofiles_quantities::{normalize_key, UnitSpec};

use crate::error::{Result, TimeSeriesError};
use crate::time::parse_naive;

/// Spacing of a synthesized time index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Frequency(Duration);

impl Frequency {
    pub fn new(step: Duration) -> Result<Self> {
        if step <= Duration::zero() {
            return Err(TimeSeriesError::InvalidFrequency {
                value: step.to_string(),
                reason: "step must be positive".to_string(),
            });
        }
        Ok(Self(step))
    }

    pub fn step(&self) -> Duration {
        self.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Frequency {
    type Err = TimeSeriesError;

    /// Accepts an optional positive multiplier followed by `ms`/`L`,
    /// `s`/`S`, `min`/`T`, `h`/`H`, `d`/`D` or `Hz`, e.g. `10min`, `5S`, `20Hz`.
    fn from_str(value: &str) -> Result<Self> {
        let invalid = |reason: &str| TimeSeriesError::InvalidFrequency {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);
        let count: i64 = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| invalid("multiplier is not an integer"))?
        };
        if count <= 0 {
            return Err(invalid("multiplier must be positive"));
        }

        let step = match unit.trim() {
            "ms" | "L" => Duration::try_milliseconds(count),
            "s" | "S" | "sec" => Duration::try_seconds(count),
            "min" | "T" => Duration::try_minutes(count),
            "h" | "H" => Duration::try_hours(count),
            "d" | "D" => Duration::try_days(count),
            "Hz" | "hz" => {
                if 1_000_000 % count != 0 {
                    return Err(invalid("rate does not divide a second into whole microseconds"));
                }
                Some(Duration::microseconds(1_000_000 / count))
            }
            "" => return Err(invalid("missing unit")),
            _ => return Err(invalid("unknown unit")),
        }
        .ok_or_else(|| invalid("step overflows"))?;

        Frequency::new(step)
    }
}

impl TryFrom<String> for Frequency {
    type Error = TimeSeriesError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A start instant (local to the configured zone) and a fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedIndex {
    pub start: NaiveDateTime,
    pub frequency: Frequency,
}

pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimeSeriesError::InvalidTimezone(name.to_string()))
}

pub fn parse_start_time(value: &str) -> Result<NaiveDateTime> {
    parse_naive(value, None).ok_or_else(|| TimeSeriesError::InvalidStartTime(value.to_string()))
}

/// Everything ingestion needs besides the table itself.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    time_zone: Tz,
    datetime_format: Option<String>,
    generated_index: Option<GeneratedIndex>,
    units: HashMap<String, UnitSpec>,
    assume_canonical_units: bool,
    drop_duplicate_timestamps: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIngestConfig {
    timezone: String,
    #[serde(default)]
    datetime_format: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    frequency: Option<Frequency>,
    #[serde(default)]
    units: HashMap<String, UnitSpec>,
    #[serde(default)]
    assume_canonical_units: bool,
    #[serde(default)]
    drop_duplicate_timestamps: bool,
}

impl IngestConfig {
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            datetime_format: None,
            generated_index: None,
            units: HashMap::new(),
            assume_canonical_units: false,
            drop_duplicate_timestamps: false,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawIngestConfig = toml::from_str(content)?;

        let generated_index = match (raw.start_time, raw.frequency) {
            (Some(start), Some(frequency)) => Some(GeneratedIndex {
                start: parse_start_time(&start)?,
                frequency,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(TimeSeriesError::PartialTimeConfiguration {
                    present: "start_time",
                    missing: "frequency",
                })
            }
            (None, Some(_)) => {
                return Err(TimeSeriesError::PartialTimeConfiguration {
                    present: "frequency",
                    missing: "start_time",
                })
            }
        };

        let config = Self {
            time_zone: parse_time_zone(&raw.timezone)?,
            datetime_format: raw.datetime_format,
            generated_index,
            units: raw.units,
            assume_canonical_units: raw.assume_canonical_units,
            drop_duplicate_timestamps: raw.drop_duplicate_timestamps,
        };
        config.validate_units()?;
        Ok(config)
    }

    /// Rejects two unit keys that normalize to the same string.
    pub fn validate_units(&self) -> Result<()> {
        let mut keys: Vec<&String> = self.units.keys().collect();
        keys.sort();

        let mut seen: HashMap<String, &String> = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(first) = seen.insert(normalize_key(key), key) {
                return Err(TimeSeriesError::ConflictingUnitDeclarations {
                    first: first.clone(),
                    second: key.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn with_unit(mut self, column: impl Into<String>, unit: impl Into<UnitSpec>) -> Self {
        self.units.insert(column.into(), unit.into());
        self
    }

    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    pub fn with_generated_index(mut self, start: NaiveDateTime, frequency: Frequency) -> Self {
        self.generated_index = Some(GeneratedIndex { start, frequency });
        self
    }

    pub fn with_assume_canonical_units(mut self, assume: bool) -> Self {
        self.assume_canonical_units = assume;
        self
    }

    pub fn with_drop_duplicate_timestamps(mut self, drop: bool) -> Self {
        self.drop_duplicate_timestamps = drop;
        self
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn datetime_format(&self) -> Option<&str> {
        self.datetime_format.as_deref()
    }

    pub fn generated_index(&self) -> Option<&GeneratedIndex> {
        self.generated_index.as_ref()
    }

    pub fn units(&self) -> &HashMap<String, UnitSpec> {
        &self.units
    }

    pub fn assume_canonical_units(&self) -> bool {
        self.assume_canonical_units
    }

    pub fn drop_duplicate_timestamps(&self) -> bool {
        self.drop_duplicate_timestamps
    }

    /// Declared unit for a column: exact name first, then a key that
    /// normalizes to the same string.
    pub fn unit_for(&self, column: &str) -> Option<&UnitSpec> {
        if let Some(spec) = self.units.get(column) {
            return Some(spec);
        }
        let wanted = normalize_key(column);
        self.units
            .iter()
            .find(|(key, _)| normalize_key(key) == wanted)
            .map(|(_, spec)| spec)
    }
}
