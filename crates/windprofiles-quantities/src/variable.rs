use std::fmt;

/// Handle to a dimension inside the [`crate::Registry`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(pub(crate) usize);

/// Handle to a variable inside the [`crate::Registry`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub(crate) usize);

/// A canonical physical quantity bound to exactly one dimension. Only the
/// registry constructs these.
#[derive(Debug, Clone)]
pub struct Variable {
    id: VariableId,
    name: String,
    aliases: Vec<String>,
    dimension: DimensionId,
}

impl Variable {
    pub(crate) fn new(
        id: VariableId,
        name: String,
        aliases: Vec<String>,
        dimension: DimensionId,
    ) -> Self {
        Self {
            id,
            name,
            aliases,
            dimension,
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
