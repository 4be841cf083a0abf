use std::collections::HashMap;

use crate::errors::{QuantityError, RegistryKind};

/// Lower-cases a key and maps `-` and ` ` to `_`. This is the only
/// normalization applied; lookups never fall back to anything looser.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace(['-', ' '], "_")
}

/// String keys to entity handles for a single entity kind.
#[derive(Debug, Clone)]
pub struct AliasRegistry<T> {
    kind: RegistryKind,
    entries: HashMap<String, T>,
}

impl<T: Copy> AliasRegistry<T> {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    pub fn register(&mut self, key: &str, entity: T) -> Result<(), QuantityError> {
        let normalized = normalize_key(key);
        if self.entries.contains_key(&normalized) {
            return Err(QuantityError::RegistrationCollision {
                kind: self.kind,
                key: normalized,
            });
        }
        self.entries.insert(normalized, entity);
        Ok(())
    }

    /// Registers every key for one entity, or none of them. Keys that
    /// collide with each other after normalization count as a collision.
    pub fn register_all<'a, I>(&mut self, keys: I, entity: T) -> Result<(), QuantityError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut pending: Vec<String> = Vec::new();
        for key in keys {
            let normalized = normalize_key(key);
            if self.entries.contains_key(&normalized) || pending.contains(&normalized) {
                return Err(QuantityError::RegistrationCollision {
                    kind: self.kind,
                    key: normalized,
                });
            }
            pending.push(normalized);
        }

        for key in pending {
            self.entries.insert(key, entity);
        }
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Option<T> {
        self.entries.get(&normalize_key(key)).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
