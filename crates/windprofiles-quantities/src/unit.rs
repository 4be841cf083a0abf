use std::fmt;
use std::sync::Arc;

use crate::errors::QuantityError;

/// A scalar transform shared between clones of a unit.
pub type Converter = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// How a unit maps onto its dimension's default unit.
///
/// `Affine` follows the registration convention used throughout the crate:
/// `offset` is the value, in this unit, that corresponds to zero default
/// units, so `default = factor * (this - offset)`.
#[derive(Clone)]
pub enum Conversion {
    Affine { factor: f64, offset: f64 },
    Custom { forward: Converter, inverse: Converter },
}

impl Conversion {
    pub const IDENTITY: Conversion = Conversion::Affine {
        factor: 1.0,
        offset: 0.0,
    };

    pub fn scale(factor: f64) -> Self {
        Conversion::Affine {
            factor,
            offset: 0.0,
        }
    }

    pub fn affine(factor: f64, offset: f64) -> Self {
        Conversion::Affine { factor, offset }
    }

    /// `forward` maps this unit to the default unit, `inverse` maps back.
    pub fn custom<F, G>(forward: F, inverse: G) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        G: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Conversion::Custom {
            forward: Arc::new(forward),
            inverse: Arc::new(inverse),
        }
    }

    pub(crate) fn validate(&self, unit: &str) -> Result<(), QuantityError> {
        if let Conversion::Affine { factor, offset } = self {
            if !factor.is_finite() || !offset.is_finite() {
                return Err(QuantityError::InvalidConversion {
                    unit: unit.to_string(),
                    reason: format!("factor {factor} and offset {offset} must be finite"),
                });
            }
            if *factor == 0.0 {
                return Err(QuantityError::InvalidConversion {
                    unit: unit.to_string(),
                    reason: "factor of zero is not invertible".to_string(),
                });
            }
        }
        Ok(())
    }

    fn forward(&self, value: f64) -> f64 {
        match self {
            Conversion::Affine { factor, offset } => factor * (value - offset),
            Conversion::Custom { forward, .. } => forward(value),
        }
    }

    fn inverse(&self, value: f64) -> f64 {
        match self {
            Conversion::Affine { factor, offset } => value / factor + offset,
            Conversion::Custom { inverse, .. } => inverse(value),
        }
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Affine { factor, offset } => f
                .debug_struct("Affine")
                .field("factor", factor)
                .field("offset", offset)
                .finish(),
            Conversion::Custom { .. } => f.write_str("Custom"),
        }
    }
}

/// A named, invertible transform to and from a dimension's default unit.
#[derive(Debug, Clone)]
pub struct Unit {
    name: String,
    conversion: Conversion,
}

impl Unit {
    pub(crate) fn new(name: impl Into<String>, conversion: Conversion) -> Self {
        Self {
            name: name.into(),
            conversion,
        }
    }

    pub(crate) fn identity(name: impl Into<String>) -> Self {
        Self::new(name, Conversion::IDENTITY)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    pub fn is_affine(&self) -> bool {
        matches!(self.conversion, Conversion::Affine { .. })
    }

    /// Value in this unit -> value in the default unit.
    pub fn to_default(&self, value: f64) -> f64 {
        self.conversion.forward(value)
    }

    /// Value in the default unit -> value in this unit.
    pub fn from_default(&self, value: f64) -> f64 {
        self.conversion.inverse(value)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
