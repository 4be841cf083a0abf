use std::collections::HashMap;

use tracing::trace;

use crate::alias::normalize_key;
use crate::angle::AngleUnit;
use crate::errors::QuantityError;
use crate::unit::{Conversion, Unit};

/// A physical quantity category with one default unit and any number of
/// alternatives. Every conversion between two of its units pivots through
/// the default unit.
#[derive(Debug, Clone)]
pub struct Dimension {
    name: String,
    aliases: Vec<String>,
    units: Vec<Unit>,
    unit_index: HashMap<String, usize>,
}

impl Dimension {
    pub fn new<I, S>(name: impl Into<String>, aliases: I, default_unit: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default_unit = Unit::identity(default_unit);
        let mut unit_index = HashMap::new();
        unit_index.insert(default_unit.name().to_string(), 0);
        Self {
            name: name.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
            units: vec![default_unit],
            unit_index,
        }
    }

    /// Adds a unit. With `ignore_existing`, a name that is already taken is
    /// skipped silently and `Ok(false)` is returned.
    pub fn register_unit(
        &mut self,
        name: impl Into<String>,
        conversion: Conversion,
        ignore_existing: bool,
    ) -> Result<bool, QuantityError> {
        let name = name.into();
        if self.unit_index.contains_key(&name) {
            if ignore_existing {
                trace!(dimension = %self.name, unit = %name, "skipping existing unit");
                return Ok(false);
            }
            return Err(QuantityError::DuplicateUnit {
                dimension: self.name.clone(),
                unit: name,
            });
        }
        conversion.validate(&name)?;

        self.unit_index.insert(name.clone(), self.units.len());
        self.units.push(Unit::new(name, conversion));
        Ok(true)
    }

    /// Builder form of [`Dimension::register_unit`] without `ignore_existing`.
    pub fn with_unit(
        mut self,
        name: impl Into<String>,
        conversion: Conversion,
    ) -> Result<Self, QuantityError> {
        self.register_unit(name, conversion, false)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn default_unit(&self) -> &Unit {
        &self.units[0]
    }

    /// Units in registration order, default first.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.unit_index.get(name).map(|idx| &self.units[*idx])
    }

    pub fn has_unit(&self, name: &str) -> bool {
        self.unit_index.contains_key(name)
    }

    pub fn require_unit(&self, name: &str) -> Result<&Unit, QuantityError> {
        self.unit(name).ok_or_else(|| QuantityError::UnsupportedUnit {
            dimension: self.name.clone(),
            unit: name.to_string(),
        })
    }

    /// Whether this dimension stores clockwise-from-North degrees.
    pub fn is_angular(&self) -> bool {
        self.default_unit().name() == AngleUnit::CANONICAL.name()
    }

    pub fn is_pressure(&self) -> bool {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .any(|key| normalize_key(key) == "pressure")
    }

    /// Two-step conversion: `to.inverse(from.forward(value))`.
    pub fn convert_between(value: f64, from: &Unit, to: &Unit) -> f64 {
        to.from_default(from.to_default(value))
    }

    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, QuantityError> {
        let from = self.require_unit(from)?;
        let to = self.require_unit(to)?;
        Ok(Self::convert_between(value, from, to))
    }

    pub fn to_default(&self, value: f64, from: &str) -> Result<f64, QuantityError> {
        Ok(self.require_unit(from)?.to_default(value))
    }

    pub fn from_default(&self, value: f64, to: &str) -> Result<f64, QuantityError> {
        Ok(self.require_unit(to)?.from_default(value))
    }
}
