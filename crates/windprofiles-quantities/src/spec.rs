use std::fmt;

use serde::{Deserialize, Serialize};

use crate::angle::{AngleMeasure, AngleUnit, Orientation, ZeroReference};
use crate::dimension::Dimension;
use crate::errors::QuantityError;
use crate::unit::{Conversion, Unit};

pub const STANDARD_GRAVITY: f64 = 9.80665;
const DRY_AIR_GAS_CONSTANT: f64 = 8.314462618 / 0.02896968;
const SPECIFIC_HEAT_CP: f64 = 1004.68506;
const SEA_LEVEL_TEMPERATURE: f64 = 288.15;

/// A declared source unit for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitSpec {
    /// A unit registered by name, or `<unit>_<meters>asl` for sea-level pressure.
    Named(String),
    Angle {
        measure: AngleMeasure,
        zero: ZeroReference,
        orientation: Orientation,
    },
    /// Pressure reported as if at sea level, for a station at `meters_asl`.
    SeaLevelPressure { unit: String, meters_asl: f64 },
}

impl UnitSpec {
    pub fn named(name: impl Into<String>) -> Self {
        UnitSpec::Named(name.into())
    }

    pub fn angle(
        measure: AngleMeasure,
        zero: impl Into<ZeroReference>,
        orientation: Orientation,
    ) -> Self {
        UnitSpec::Angle {
            measure,
            zero: zero.into(),
            orientation,
        }
    }

    pub fn sea_level(unit: impl Into<String>, meters_asl: f64) -> Self {
        UnitSpec::SeaLevelPressure {
            unit: unit.into(),
            meters_asl,
        }
    }

    /// Name a registry would know this unit by.
    pub fn unit_name(&self) -> String {
        match self {
            UnitSpec::Named(name) => name.clone(),
            UnitSpec::Angle {
                measure,
                zero,
                orientation,
            } => AngleUnit::new(*measure, *orientation, *zero).name(),
            UnitSpec::SeaLevelPressure { unit, meters_asl } => format!("{unit}_{meters_asl}asl"),
        }
    }
}

impl fmt::Display for UnitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unit_name())
    }
}

impl From<&str> for UnitSpec {
    fn from(value: &str) -> Self {
        UnitSpec::Named(value.to_string())
    }
}

impl From<String> for UnitSpec {
    fn from(value: String) -> Self {
        UnitSpec::Named(value)
    }
}

impl From<AngleUnit> for UnitSpec {
    fn from(value: AngleUnit) -> Self {
        UnitSpec::Angle {
            measure: value.measure,
            zero: value.zero,
            orientation: value.orientation,
        }
    }
}

/// Ratio of station pressure to sea-level pressure at `meters_asl`, using the
/// standard atmosphere lapse relation.
pub fn station_pressure_ratio(meters_asl: f64) -> f64 {
    let exponent = SPECIFIC_HEAT_CP / DRY_AIR_GAS_CONSTANT;
    let coefficient =
        1.0 - (STANDARD_GRAVITY * meters_asl) / (SPECIFIC_HEAT_CP * SEA_LEVEL_TEMPERATURE);
    coefficient.powf(exponent)
}

fn split_sea_level_suffix(name: &str) -> Option<(&str, f64)> {
    let (base, suffix) = name.rsplit_once('_')?;
    let meters = suffix.strip_suffix("asl")?;
    let meters = meters.strip_suffix('m').unwrap_or(meters);
    meters.parse::<f64>().ok().map(|meters| (base, meters))
}

impl Dimension {
    /// Resolves a declared unit against this dimension. Registered units are
    /// returned as-is; angle triples with a numeric zero and sea-level
    /// pressure declarations produce a derived, unregistered unit.
    pub fn resolve(&self, spec: &UnitSpec) -> Result<Unit, QuantityError> {
        match spec {
            UnitSpec::Named(name) => {
                if let Some(unit) = self.unit(name) {
                    return Ok(unit.clone());
                }
                match split_sea_level_suffix(name) {
                    Some((base, meters_asl)) => self.sea_level_unit(base, meters_asl),
                    None => Err(self.unsupported(name)),
                }
            }
            UnitSpec::Angle {
                measure,
                zero,
                orientation,
            } => {
                let angle = AngleUnit::new(*measure, *orientation, *zero);
                let name = angle.name();
                if let Some(unit) = self.unit(&name) {
                    return Ok(unit.clone());
                }
                if self.is_angular() && zero.bearing().is_finite() {
                    Ok(Unit::new(name, angle.conversion()))
                } else {
                    Err(self.unsupported(&name))
                }
            }
            UnitSpec::SeaLevelPressure { unit, meters_asl } => {
                self.sea_level_unit(unit, *meters_asl)
            }
        }
    }

    fn sea_level_unit(&self, base: &str, meters_asl: f64) -> Result<Unit, QuantityError> {
        let name = format!("{base}_{meters_asl}asl");
        if !self.is_pressure() {
            return Err(self.unsupported(&name));
        }
        let base = self.require_unit(base)?.clone();
        let ratio = station_pressure_ratio(meters_asl);
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(QuantityError::InvalidConversion {
                unit: name,
                reason: format!("no station pressure defined at {meters_asl} m above sea level"),
            });
        }

        let inverse_base = base.clone();
        let conversion = Conversion::custom(
            move |value| base.to_default(value) * ratio,
            move |value| inverse_base.from_default(value / ratio),
        );
        Ok(Unit::new(name, conversion))
    }

    fn unsupported(&self, unit: &str) -> QuantityError {
        QuantityError::UnsupportedUnit {
            dimension: self.name().to_string(),
            unit: unit.to_string(),
        }
    }
}
