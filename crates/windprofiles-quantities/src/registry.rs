use tracing::debug;

use crate::alias::AliasRegistry;
use crate::dimension::Dimension;
use crate::errors::{QuantityError, RegistryKind};
use crate::variable::{DimensionId, Variable, VariableId};

/// Dimensions and variables for one process (or one test).
///
/// Population takes `&mut self`; once built, wrap it in an `Arc` and share it.
/// Lookups only need `&self`, so concurrent readers need no locking.
#[derive(Debug, Clone)]
pub struct Registry {
    dimensions: Vec<Dimension>,
    dimension_keys: AliasRegistry<DimensionId>,
    variables: Vec<Variable>,
    variable_keys: AliasRegistry<VariableId>,
    time_variable: Option<VariableId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            dimensions: Vec::new(),
            dimension_keys: AliasRegistry::new(RegistryKind::Dimension),
            variables: Vec::new(),
            variable_keys: AliasRegistry::new(RegistryKind::Variable),
            time_variable: None,
        }
    }

    pub fn register_dimension(&mut self, dimension: Dimension) -> Result<DimensionId, QuantityError> {
        let id = DimensionId(self.dimensions.len());
        let keys = std::iter::once(dimension.name())
            .chain(dimension.aliases().iter().map(String::as_str));
        self.dimension_keys.register_all(keys, id)?;
        debug!(
            dimension = dimension.name(),
            units = dimension.units().len(),
            "registered dimension"
        );
        self.dimensions.push(dimension);
        Ok(id)
    }

    pub fn register_variable<I, S>(
        &mut self,
        name: impl Into<String>,
        aliases: I,
        dimension: DimensionId,
    ) -> Result<VariableId, QuantityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let owner = self
            .dimensions
            .get(dimension.0)
            .ok_or_else(|| QuantityError::UnknownDimension(format!("#{}", dimension.0)))?;
        let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();

        let id = VariableId(self.variables.len());
        let keys = std::iter::once(name.as_str()).chain(aliases.iter().map(String::as_str));
        self.variable_keys.register_all(keys, id)?;
        debug!(variable = %name, dimension = owner.name(), "registered variable");

        self.variables.push(Variable::new(id, name, aliases, dimension));
        Ok(id)
    }

    /// Registers the variable whose column becomes the row index during
    /// ingestion. Only one may be designated.
    pub fn register_time_variable<I, S>(
        &mut self,
        name: impl Into<String>,
        aliases: I,
        dimension: DimensionId,
    ) -> Result<VariableId, QuantityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(existing) = self.time_variable() {
            return Err(QuantityError::RegistrationCollision {
                kind: RegistryKind::Variable,
                key: format!("time variable (already {})", existing.name()),
            });
        }
        let id = self.register_variable(name, aliases, dimension)?;
        self.time_variable = Some(id);
        Ok(id)
    }

    /// Mutable access for adding units during population.
    pub fn dimension_mut(&mut self, id: DimensionId) -> Option<&mut Dimension> {
        self.dimensions.get_mut(id.0)
    }

    pub fn dimension(&self, alias: &str) -> Option<&Dimension> {
        self.dimension_keys
            .lookup(alias)
            .and_then(|id| self.dimension_by_id(id))
    }

    pub fn dimension_id(&self, alias: &str) -> Option<DimensionId> {
        self.dimension_keys.lookup(alias)
    }

    pub fn require_dimension(&self, alias: &str) -> Result<&Dimension, QuantityError> {
        self.dimension(alias)
            .ok_or_else(|| QuantityError::UnknownDimension(alias.to_string()))
    }

    pub fn dimension_by_id(&self, id: DimensionId) -> Option<&Dimension> {
        self.dimensions.get(id.0)
    }

    /// Resolves an alias to a variable. A miss is a normal outcome here.
    pub fn variable(&self, alias: &str) -> Option<&Variable> {
        self.variable_keys
            .lookup(alias)
            .and_then(|id| self.variable_by_id(id))
    }

    /// Like [`Registry::variable`], for callers where a miss is an error.
    pub fn require_variable(&self, alias: &str) -> Result<&Variable, QuantityError> {
        self.variable(alias)
            .ok_or_else(|| QuantityError::UnknownVariable(alias.to_string()))
    }

    pub fn variable_by_id(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    pub fn dimension_of(&self, variable: &Variable) -> Option<&Dimension> {
        self.dimension_by_id(variable.dimension())
    }

    pub fn time_variable(&self) -> Option<&Variable> {
        self.time_variable.and_then(|id| self.variable_by_id(id))
    }

    pub fn is_time_variable(&self, id: VariableId) -> bool {
        self.time_variable == Some(id)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// First dimension (in registration order) that knows a unit by this name.
    pub fn dimension_of_unit(&self, unit: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|dimension| dimension.has_unit(unit))
    }
}
