use std::fmt;

use thiserror::Error;

/// Which alias namespace a key belongs to. Dimensions and variables are
/// registered independently, so the same key may exist in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    Dimension,
    Variable,
}

impl RegistryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::Dimension => "dimension",
            RegistryKind::Variable => "variable",
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantityError {
    #[error("{kind} alias '{key}' is already registered")]
    RegistrationCollision { kind: RegistryKind, key: String },

    #[error("unit '{unit}' is already registered for dimension {dimension}")]
    DuplicateUnit { dimension: String, unit: String },

    #[error("unit '{unit}' has an invalid conversion: {reason}")]
    InvalidConversion { unit: String, reason: String },

    #[error("no dimension registered under '{0}'")]
    UnknownDimension(String),

    #[error("no variable registered under '{0}'")]
    UnknownVariable(String),

    #[error("unit '{unit}' is not registered for dimension {dimension}")]
    UnsupportedUnit { dimension: String, unit: String },

    #[error("unrecognized angle {component} '{value}'")]
    InvalidAngleComponent {
        component: &'static str,
        value: String,
    },
}
