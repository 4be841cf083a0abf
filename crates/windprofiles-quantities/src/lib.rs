//! Unit, dimension and variable registries for loosely named meteorological
//! measurements.

pub mod alias;
pub mod angle;
pub mod dimension;
pub mod errors;
mod registry;
pub mod spec;
pub mod standard;
pub mod unit;
pub mod variable;

pub use alias::{normalize_key, AliasRegistry};
pub use angle::{AngleMeasure, AngleUnit, Cardinal, Orientation, ZeroReference};
pub use dimension::Dimension;
pub use errors::{QuantityError, RegistryKind};
pub use registry::Registry;
pub use spec::UnitSpec;
pub use unit::{Conversion, Converter, Unit};
pub use variable::{DimensionId, Variable, VariableId};
