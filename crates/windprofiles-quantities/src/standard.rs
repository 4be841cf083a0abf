//! Built-in meteorological dimensions and variables.
//!
//! Canonical units: temperature in K, pressure in kPa, fractions as 0-1
//! decimals, speed in m/s, directions in degrees clockwise from North.

use crate::angle::AngleUnit;
use crate::dimension::Dimension;
use crate::errors::QuantityError;
use crate::registry::Registry;
use crate::unit::Conversion;

pub const TEMPERATURE: &str = "Temperature";
pub const PRESSURE: &str = "Pressure";
pub const DIMENSIONLESS: &str = "Dimensionless";
pub const SPECIFIC: &str = "Specific";
pub const DENSITY: &str = "Density";
pub const SPEED: &str = "Speed";
pub const LENGTH: &str = "Length";
pub const ANGLE: &str = "Angle";
pub const INSTANT: &str = "Instant";

pub const TIMESTAMP_VARIABLE: &str = "Timestamp";

fn temperature() -> Result<Dimension, QuantityError> {
    Dimension::new(TEMPERATURE, ["T"], "K")
        .with_unit("C", Conversion::affine(1.0, -273.15))?
        .with_unit("°C", Conversion::affine(1.0, -273.15))?
        .with_unit("F", Conversion::affine(5.0 / 9.0, -459.67))?
        .with_unit("°F", Conversion::affine(5.0 / 9.0, -459.67))?
        .with_unit("R", Conversion::scale(5.0 / 9.0))
}

fn pressure() -> Result<Dimension, QuantityError> {
    Dimension::new(PRESSURE, Vec::<String>::new(), "kPa")
        .with_unit("Pa", Conversion::scale(0.001))?
        .with_unit("N/m^2", Conversion::scale(0.001))?
        .with_unit("hPa", Conversion::scale(0.1))?
        .with_unit("mb", Conversion::scale(0.1))?
        .with_unit("mBar", Conversion::scale(0.1))?
        .with_unit("atm", Conversion::scale(101.325))?
        .with_unit("mmHg", Conversion::scale(0.133322368))?
        .with_unit("inHg", Conversion::scale(3.38639))?
        .with_unit("psi", Conversion::scale(6.89475729))
}

fn dimensionless() -> Result<Dimension, QuantityError> {
    Dimension::new(DIMENSIONLESS, ["Dimless", "Fractional"], "decimal")
        .with_unit("%", Conversion::scale(0.01))?
        .with_unit("percent", Conversion::scale(0.01))?
        .with_unit("1", Conversion::IDENTITY)?
        .with_unit(".", Conversion::IDENTITY)?
        .with_unit("unitless", Conversion::IDENTITY)
}

fn specific() -> Result<Dimension, QuantityError> {
    Dimension::new(SPECIFIC, Vec::<String>::new(), "g/g")
        .with_unit("kg/kg", Conversion::IDENTITY)?
        .with_unit("g/kg", Conversion::scale(0.001))
}

fn density() -> Result<Dimension, QuantityError> {
    Dimension::new(DENSITY, Vec::<String>::new(), "g/L")
        .with_unit("kg/m^3", Conversion::IDENTITY)?
        .with_unit("g/m^3", Conversion::scale(0.001))
}

fn speed() -> Result<Dimension, QuantityError> {
    Dimension::new(SPEED, ["Velocity"], "m/s")
        .with_unit("km/h", Conversion::scale(1.0 / 3.6))?
        .with_unit("mph", Conversion::scale(0.44704))?
        .with_unit("mi/hr", Conversion::scale(0.44704))?
        .with_unit("mi/h", Conversion::scale(0.44704))?
        .with_unit("kn", Conversion::scale(0.514444))?
        .with_unit("knots", Conversion::scale(0.514444))?
        .with_unit("ft/s", Conversion::scale(0.3048))
}

fn length() -> Result<Dimension, QuantityError> {
    Dimension::new(LENGTH, ["Distance"], "m")
        .with_unit("km", Conversion::scale(1000.0))?
        .with_unit("ft", Conversion::scale(0.3048))
}

fn angle() -> Result<Dimension, QuantityError> {
    let mut angle = Dimension::new(ANGLE, ["Direction"], AngleUnit::CANONICAL.name());
    // degCW-N is the default unit and is skipped.
    for family in AngleUnit::cardinal_families() {
        angle.register_unit(family.name(), family.conversion(), true)?;
    }
    Ok(angle)
}

impl Registry {
    /// The meteorological registry used by ingestion.
    pub fn standard() -> Result<Self, QuantityError> {
        let mut registry = Registry::new();

        let temperature = registry.register_dimension(temperature()?)?;
        let pressure = registry.register_dimension(pressure()?)?;
        let dimensionless = registry.register_dimension(dimensionless()?)?;
        let specific = registry.register_dimension(specific()?)?;
        let density = registry.register_dimension(density()?)?;
        let speed = registry.register_dimension(speed()?)?;
        let length = registry.register_dimension(length()?)?;
        let angle = registry.register_dimension(angle()?)?;
        let instant =
            registry.register_dimension(Dimension::new(INSTANT, ["Time"], "timestamp"))?;

        registry.register_time_variable(
            TIMESTAMP_VARIABLE,
            ["time", "datetime", "date_time"],
            instant,
        )?;

        registry.register_variable("Temperature", ["t", "temp", "tmpr"], temperature)?;
        registry.register_variable("Dewpoint", ["dwpt", "dew", "tdew"], temperature)?;
        registry.register_variable("Virtual Temperature", ["tv", "t_v"], temperature)?;
        registry.register_variable("Sonic Temperature", ["ts", "t_sonic"], temperature)?;
        registry.register_variable(
            "Relative Humidity",
            ["rh", "rhum", "relh"],
            dimensionless,
        )?;
        registry.register_variable("Pressure", ["p", "pres", "baro"], pressure)?;
        registry.register_variable("Wind Speed", ["ws", "wspd", "speed"], speed)?;
        registry.register_variable("Wind Direction", ["wd", "wdir", "dir"], angle)?;
        registry.register_variable("Wind U", ["u", "ux"], speed)?;
        registry.register_variable("Wind V", ["v", "uy"], speed)?;
        registry.register_variable("Wind W", ["w", "uz"], speed)?;
        registry.register_variable("Specific Humidity", ["q", "sh"], specific)?;
        registry.register_variable("Air Density", ["rho"], density)?;
        registry.register_variable("Height", ["z", "elevation"], length)?;

        Ok(registry)
    }
}
