// world.rs - Facade over the entity allocator and the component store
//
// The world is the only place that both creates handles and attaches data, so
// it owns the allocator/store ordering: components are stripped before a
// handle is released for reuse.

use crate::query::QueryBuilder;
use tessera_core::ecs::{Component, Entity, EntityAllocator, Store, StoreStats};
use tessera_core::{ConfigError, StoreConfig};
use thiserror::Error;

/// Errors surfaced by the world facade.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("entity {entity} is not alive")]
    EntityNotAlive { entity: Entity },
}

/// Entity allocator and component store behind one API.
#[derive(Default)]
pub struct World {
    allocator: EntityAllocator,
    store: Store,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            allocator: EntityAllocator::new(),
            store: Store::with_config(config)?,
        })
    }

    /// Allocate a fresh (or recycled) entity with no components.
    pub fn spawn(&mut self) -> Entity {
        self.allocator.create()
    }

    /// Strip every component from `entity` and release its handle.
    ///
    /// Returns `false` if the entity was not alive.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.allocator.exists(entity) {
            return false;
        }
        self.store.remove_all_components(entity);
        self.allocator.destroy(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.exists(entity)
    }

    /// Attach (or overwrite) a component on a live entity.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), WorldError> {
        if !self.allocator.exists(entity) {
            return Err(WorldError::EntityNotAlive { entity });
        }
        self.store.add_component(entity, value);
        Ok(())
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store.get_component(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store.get_component_mut(entity)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.store.has_component::<T>(entity)
    }

    /// Detach `T` from `entity`. Returns `false` if it had none.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        self.store.remove_component::<T>(entity)
    }

    /// Start a fluent multi-component query.
    pub fn query(&mut self) -> QueryBuilder<'_> {
        QueryBuilder::new(&mut self.store)
    }

    /// Every entity that has a `T`, uncached.
    pub fn query_one<T: Component>(&self) -> Vec<Entity> {
        match self.store.lookup_type::<T>() {
            Some(ty) => self.store.query_one(ty.id()),
            None => Vec::new(),
        }
    }

    pub fn begin_batch(&mut self) {
        self.store.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.store.end_batch();
    }

    /// Run `f` with cache invalidation coalesced into one pass at the end.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut World) -> R) -> R {
        self.begin_batch();
        let result = f(self);
        self.end_batch();
        result
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Number of live entity handles, with or without components.
    pub fn entity_count(&self) -> usize {
        self.allocator.live_count()
    }

    /// Release every handle and remove all component data.
    pub fn clear(&mut self) {
        self.store.clear();
        self.allocator.clear();
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }
}
