//! Fluent multi-component queries.

use tessera_core::ecs::{Component, ComponentTypeId, Entity, Store};

/// Collects component types and runs a cached query against the store.
///
/// Naming a type the store has never seen makes the query match nothing; the
/// type is not registered as a side effect.
pub struct QueryBuilder<'w> {
    store: &'w mut Store,
    types: Vec<ComponentTypeId>,
    unknown: bool,
}

impl<'w> QueryBuilder<'w> {
    pub fn new(store: &'w mut Store) -> Self {
        Self {
            store,
            types: Vec::new(),
            unknown: false,
        }
    }

    /// Require component `T`.
    pub fn with<T: Component>(mut self) -> Self {
        match self.store.lookup_type::<T>() {
            Some(ty) => self.types.push(ty.id()),
            None => self.unknown = true,
        }
        self
    }

    /// Matching entities, grouped by archetype.
    pub fn entities(self) -> Vec<Entity> {
        if self.unknown {
            return Vec::new();
        }
        self.store.query_all(&self.types)
    }

    pub fn count(self) -> usize {
        self.entities().len()
    }
}
