//! Angular units.
//!
//! Directions are stored as degrees, clockwise, zero at North, in `[0, 360)`.
//! Any other angular unit is described by three independent axes: the
//! measure (degrees or radians), the orientation (clockwise or
//! counterclockwise) and the zero reference (a cardinal point or a numeric
//! offset in degrees). Forward conversion applies, in order: measure to
//! degrees, orientation flip, zero offset. The inverse undoes them in the
//! opposite order.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::QuantityError;
use crate::unit::Conversion;

const FULL_TURN: f64 = 360.0;

/// Wraps into `[0, 360)`. `rem_euclid` can round up to exactly 360 for tiny
/// negative inputs, which is folded back to 0.
pub fn wrap_degrees(value: f64) -> f64 {
    let wrapped = value.rem_euclid(FULL_TURN);
    if wrapped >= FULL_TURN {
        0.0
    } else {
        wrapped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AngleMeasure {
    Degrees,
    Radians,
}

impl AngleMeasure {
    pub const ALL: [AngleMeasure; 2] = [AngleMeasure::Degrees, AngleMeasure::Radians];

    pub fn as_str(&self) -> &'static str {
        match self {
            AngleMeasure::Degrees => "deg",
            AngleMeasure::Radians => "rad",
        }
    }

    fn to_degrees(self, value: f64) -> f64 {
        match self {
            AngleMeasure::Degrees => value,
            AngleMeasure::Radians => value * 180.0 / PI,
        }
    }

    fn from_degrees(self, value: f64) -> f64 {
        match self {
            AngleMeasure::Degrees => value,
            AngleMeasure::Radians => value * PI / 180.0,
        }
    }
}

impl TryFrom<&str> for AngleMeasure {
    type Error = QuantityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deg" | "degree" | "degrees" => Ok(AngleMeasure::Degrees),
            "rad" | "radian" | "radians" => Ok(AngleMeasure::Radians),
            other => Err(QuantityError::InvalidAngleComponent {
                component: "measure",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for AngleMeasure {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AngleMeasure::try_from(value.as_str())
    }
}

impl From<AngleMeasure> for String {
    fn from(value: AngleMeasure) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Orientation {
    Clockwise,
    Counterclockwise,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Clockwise, Orientation::Counterclockwise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Clockwise => "CW",
            Orientation::Counterclockwise => "CCW",
        }
    }

    /// Flipping is its own inverse modulo a full turn.
    fn align(self, degrees: f64) -> f64 {
        match self {
            Orientation::Clockwise => degrees,
            Orientation::Counterclockwise => wrap_degrees(-degrees),
        }
    }
}

impl TryFrom<&str> for Orientation {
    type Error = QuantityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cw" | "clockwise" => Ok(Orientation::Clockwise),
            "ccw" | "counterclockwise" | "anticlockwise" => Ok(Orientation::Counterclockwise),
            other => Err(QuantityError::InvalidAngleComponent {
                component: "orientation",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Orientation::try_from(value.as_str())
    }
}

impl From<Orientation> for String {
    fn from(value: Orientation) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [Cardinal::North, Cardinal::East, Cardinal::South, Cardinal::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinal::North => "N",
            Cardinal::East => "E",
            Cardinal::South => "S",
            Cardinal::West => "W",
        }
    }

    /// Clockwise bearing from North.
    pub fn bearing(&self) -> f64 {
        match self {
            Cardinal::North => 0.0,
            Cardinal::East => 90.0,
            Cardinal::South => 180.0,
            Cardinal::West => 270.0,
        }
    }
}

impl TryFrom<&str> for Cardinal {
    type Error = QuantityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Cardinal::North),
            "e" | "east" => Ok(Cardinal::East),
            "s" | "south" => Ok(Cardinal::South),
            "w" | "west" => Ok(Cardinal::West),
            other => Err(QuantityError::InvalidAngleComponent {
                component: "zero reference",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Cardinal {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cardinal::try_from(value.as_str())
    }
}

impl From<Cardinal> for String {
    fn from(value: Cardinal) -> Self {
        value.as_str().to_string()
    }
}

/// Where zero sits, as a cardinal point or a clockwise-from-North bearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZeroReference {
    Cardinal(Cardinal),
    Degrees(f64),
}

impl ZeroReference {
    pub fn bearing(&self) -> f64 {
        match self {
            ZeroReference::Cardinal(cardinal) => cardinal.bearing(),
            ZeroReference::Degrees(degrees) => *degrees,
        }
    }
}

impl fmt::Display for ZeroReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroReference::Cardinal(cardinal) => f.write_str(cardinal.as_str()),
            ZeroReference::Degrees(degrees) => write!(f, "{degrees}"),
        }
    }
}

impl From<Cardinal> for ZeroReference {
    fn from(value: Cardinal) -> Self {
        ZeroReference::Cardinal(value)
    }
}

/// One member of the angular unit family. `Copy`, so each converter closure
/// owns the offset it was built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleUnit {
    pub measure: AngleMeasure,
    pub orientation: Orientation,
    pub zero: ZeroReference,
}

impl AngleUnit {
    pub const CANONICAL: AngleUnit = AngleUnit {
        measure: AngleMeasure::Degrees,
        orientation: Orientation::Clockwise,
        zero: ZeroReference::Cardinal(Cardinal::North),
    };

    pub fn new(
        measure: AngleMeasure,
        orientation: Orientation,
        zero: impl Into<ZeroReference>,
    ) -> Self {
        Self {
            measure,
            orientation,
            zero: zero.into(),
        }
    }

    /// Registered name, e.g. `degCW-N` or `radCCW-E`.
    pub fn name(&self) -> String {
        format!(
            "{}{}-{}",
            self.measure.as_str(),
            self.orientation.as_str(),
            self.zero
        )
    }

    pub fn to_canonical(&self, value: f64) -> f64 {
        let degrees = self.measure.to_degrees(value);
        let clockwise = self.orientation.align(degrees);
        wrap_degrees(clockwise + self.zero.bearing())
    }

    pub fn from_canonical(&self, value: f64) -> f64 {
        let shifted = wrap_degrees(value - self.zero.bearing());
        let oriented = self.orientation.align(shifted);
        self.measure.from_degrees(oriented)
    }

    pub fn conversion(self) -> Conversion {
        Conversion::custom(
            move |value| self.to_canonical(value),
            move |value| self.from_canonical(value),
        )
    }

    /// Every measure/orientation combination for the four cardinal zeros.
    pub fn cardinal_families() -> Vec<AngleUnit> {
        let mut units = Vec::with_capacity(16);
        for zero in Cardinal::ALL {
            for measure in AngleMeasure::ALL {
                for orientation in Orientation::ALL {
                    units.push(AngleUnit::new(measure, orientation, zero));
                }
            }
        }
        units
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
