// store.rs - Archetype store: component membership, migration and queries
//
// Entities are grouped by their exact component set. Adding or removing a
// component moves the entity's whole row to the archetype for the new set;
// removals compact the source archetype by swap-remove.

use crate::config::{ConfigError, StoreConfig};
use crate::ecs::query_cache::QueryCache;
use crate::ecs::{
    Archetype, ArchetypeId, Component, ComponentType, ComponentTypeId, Entity, EntityLocation,
    Signature, TypeRegistry,
};
use crate::ecs::entity::EntityLocations;
use crate::pool::ComponentPools;
use serde::Serialize;
use std::collections::HashMap;

/// Snapshot of store-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StoreStats {
    pub archetype_count: usize,
    pub live_entity_count: usize,
    pub cached_query_count: usize,
    pub component_type_count: usize,
}

/// In-memory archetype-based component store.
///
/// The store never creates or destroys entity handles; it only tracks which
/// components are attached to them. Not synchronized; drive it from one thread.
pub struct Store {
    config: StoreConfig,
    registry: TypeRegistry,
    archetypes: Vec<Archetype>,
    archetype_index: HashMap<Signature, ArchetypeId>,
    comp_index: HashMap<ComponentTypeId, Vec<ArchetypeId>>,
    locations: EntityLocations,
    cache: QueryCache,
    pools: ComponentPools,
}

impl Store {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::from_validated(StoreConfig::default())
    }

    /// Create an empty store after checking `config`.
    pub fn with_config(config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: StoreConfig) -> Self {
        let pools = ComponentPools::new(config.pool_capacity);
        Self {
            config,
            registry: TypeRegistry::new(),
            archetypes: Vec::new(),
            archetype_index: HashMap::new(),
            comp_index: HashMap::new(),
            locations: EntityLocations::new(),
            cache: QueryCache::new(),
            pools,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Type registry
    // ------------------------------------------------------------------

    /// Token for `T`, registering the type on first use.
    pub fn component_type<T: Component>(&mut self) -> ComponentType<T> {
        let ty = self.registry.id_for::<T>();
        self.pools.ensure::<T>(ty.id());
        ty
    }

    /// Token for `T` only if this store has seen the type before.
    pub fn lookup_type<T: Component>(&self) -> Option<ComponentType<T>> {
        self.registry.lookup::<T>()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Attach `value` to `entity`, overwriting in place if the entity already
    /// has a `T`. Otherwise the entity migrates to the archetype for its
    /// current set plus `T`.
    pub fn add_component<T: Component>(&mut self, entity: Entity, value: T) {
        let id = self.component_type::<T>().id();

        let Some(location) = self.locations.get(entity) else {
            let arch_id = self.get_or_create_archetype(Signature::single(id));
            let archetype = &mut self.archetypes[arch_id];
            let row = archetype.push_entity(entity);
            if let Some(column) = archetype.typed_column_mut::<T>(id) {
                column.push(value);
            }
            self.locations.insert(entity, EntityLocation { archetype: arch_id, row });
            self.cache.invalidate();
            return;
        };

        if self.archetypes[location.archetype].contains(id) {
            let replaced = self.archetypes[location.archetype]
                .typed_column_mut::<T>(id)
                .and_then(|column| column.replace(location.row, value));
            if let (Some(previous), Some(pool)) = (replaced, self.pools.get_mut::<T>(id)) {
                pool.recycle(previous);
            }
            return;
        }

        let signature = self.archetypes[location.archetype].signature().with(id);
        let target = self.get_or_create_archetype(signature);
        self.migrate(entity, location, target, None);
        if let Some(column) = self.archetypes[target].typed_column_mut::<T>(id) {
            column.push(value);
        }
        debug_assert!(self.archetypes[target].is_row_aligned());
        self.cache.invalidate();
    }

    /// Borrow `entity`'s `T`, if attached.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        let id = self.registry.lookup::<T>()?.id();
        let location = self.locations.get(entity)?;
        self.archetypes[location.archetype]
            .typed_column::<T>(id)?
            .get(location.row)
    }

    /// Mutably borrow `entity`'s `T`. Not a structural change.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let id = self.registry.lookup::<T>()?.id();
        let location = self.locations.get(entity)?;
        self.archetypes[location.archetype]
            .typed_column_mut::<T>(id)?
            .get_mut(location.row)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.registry
            .lookup::<T>()
            .is_some_and(|ty| self.has_component_id(entity, ty.id()))
    }

    pub fn has_component_id(&self, entity: Entity, id: ComponentTypeId) -> bool {
        self.locations
            .get(entity)
            .is_some_and(|location| self.archetypes[location.archetype].contains(id))
    }

    /// Detach `entity`'s `T`. Returns `false` if it had none.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        match self.registry.lookup::<T>() {
            Some(ty) => self.remove_component_id(entity, ty.id()),
            None => false,
        }
    }

    /// Detach a component by type ID. The evicted instance goes to its pool.
    pub fn remove_component_id(&mut self, entity: Entity, id: ComponentTypeId) -> bool {
        let Some(location) = self.locations.get(entity) else {
            return false;
        };
        let signature = self.archetypes[location.archetype].signature();
        if !signature.contains(id) {
            return false;
        }

        let reduced = signature.without(id);
        if reduced.is_empty() {
            return self.remove_all_components(entity);
        }

        let target = self.get_or_create_archetype(reduced);
        self.migrate(entity, location, target, Some(id));
        debug_assert!(self.archetypes[target].is_row_aligned());
        self.cache.invalidate();
        true
    }

    /// Detach every component of `entity`. Idempotent: returns `false` if the
    /// entity had no components.
    pub fn remove_all_components(&mut self, entity: Entity) -> bool {
        let Some(location) = self.locations.remove(entity) else {
            return false;
        };
        let archetype = &mut self.archetypes[location.archetype];
        if let Some(moved) = archetype.swap_remove_row(location.row, &mut self.pools) {
            self.locations.set_row(moved, location.row);
        }
        self.cache.invalidate();
        true
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Every entity that has component `id`, uncached.
    pub fn query_one(&self, id: ComponentTypeId) -> Vec<Entity> {
        let Some(archetypes) = self.comp_index.get(&id) else {
            return Vec::new();
        };
        archetypes
            .iter()
            .flat_map(|&arch| self.archetypes[arch].entities().iter().copied())
            .collect()
    }

    /// Every entity that has all of `types`, served from the query cache.
    ///
    /// Entities are grouped by archetype in archetype creation order. The
    /// returned list is a snapshot; mutating the store afterwards does not
    /// change it. An empty type set matches nothing.
    pub fn query_all(&mut self, types: &[ComponentTypeId]) -> Vec<Entity> {
        let signature = Signature::from_ids(types.iter().copied());
        if signature.is_empty() {
            return Vec::new();
        }

        let archetypes = &self.archetypes;
        let comp_index = &self.comp_index;
        self.cache
            .resolve(&signature, |signature, entities, contributing| {
                // Scan only the archetypes of the rarest queried type. Each
                // index list is in creation order, so discovery order holds.
                let mut candidates: &[ArchetypeId] = &[];
                for (i, id) in signature.ids().iter().enumerate() {
                    let Some(list) = comp_index.get(id) else {
                        return;
                    };
                    if i == 0 || list.len() < candidates.len() {
                        candidates = list.as_slice();
                    }
                }

                for &arch_id in candidates {
                    let archetype = &archetypes[arch_id];
                    if archetype.signature().is_superset_of(signature) {
                        contributing.push(arch_id);
                        entities.extend_from_slice(archetype.entities());
                    }
                }
            })
            .to_vec()
    }

    /// Drop every cached query result.
    pub fn clear_query_cache(&mut self) {
        tracing::debug!(entries = self.cache.len(), "clearing query cache");
        self.cache.clear();
    }

    /// Start coalescing cache invalidation. Nested calls are absorbed.
    pub fn begin_batch(&mut self) {
        self.cache.begin_batch();
    }

    /// Apply one invalidation pass covering every change since `begin_batch`.
    pub fn end_batch(&mut self) {
        self.cache.end_batch();
    }

    pub fn is_batching(&self) -> bool {
        self.cache.is_batching()
    }

    /// Archetypes that fed the last computation of the query for `types`.
    pub fn cached_archetypes(&self, types: &[ComponentTypeId]) -> Option<&[ArchetypeId]> {
        self.cache
            .contributing_archetypes(&Signature::from_ids(types.iter().copied()))
    }

    // ------------------------------------------------------------------
    // Pooling
    // ------------------------------------------------------------------

    /// Offer an instance to `T`'s pool. Returns `false` if it was dropped.
    pub fn recycle<T: Component>(&mut self, value: T) -> bool {
        let id = self.component_type::<T>().id();
        self.pools
            .get_mut::<T>(id)
            .is_some_and(|pool| pool.recycle(value))
    }

    /// Reuse a pooled `T` or build one with `factory`.
    pub fn acquire_or_create<T: Component>(&mut self, factory: impl FnOnce() -> T) -> T {
        let id = self.component_type::<T>().id();
        match self.pools.get_mut::<T>(id) {
            Some(pool) => pool.acquire_or_create(factory),
            None => factory(),
        }
    }

    /// Number of pooled `T` instances.
    pub fn pooled_count<T: Component>(&self) -> usize {
        self.registry
            .lookup::<T>()
            .and_then(|ty| self.pools.get::<T>(ty.id()))
            .map_or(0, |pool| pool.len())
    }

    /// Pooled instances across every component type.
    pub fn pooled_total(&self) -> usize {
        self.pools.total_len()
    }

    /// Per-type pool cap.
    pub fn pool_capacity(&self) -> usize {
        self.pools.capacity()
    }

    /// Drop every pooled instance. Pools stay registered.
    pub fn clear_pools(&mut self) {
        tracing::debug!(pooled = self.pools.total_len(), "clearing component pools");
        self.pools.clear();
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn location_of(&self, entity: Entity) -> Option<EntityLocation> {
        self.locations.get(entity)
    }

    /// Component set of `entity`'s archetype.
    pub fn signature_of(&self, entity: Entity) -> Option<&Signature> {
        let location = self.locations.get(entity)?;
        Some(self.archetypes[location.archetype].signature())
    }

    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id)
    }

    pub fn archetype_mut(&mut self, id: ArchetypeId) -> Option<&mut Archetype> {
        self.archetypes.get_mut(id)
    }

    /// All archetypes in creation order, including empty ones.
    pub fn archetypes(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    /// Archetypes that contain component `id`, in creation order.
    pub fn archetypes_with(&self, id: ComponentTypeId) -> &[ArchetypeId] {
        self.comp_index.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            archetype_count: self.archetypes.len(),
            live_entity_count: self.locations.len(),
            cached_query_count: self.cache.len(),
            component_type_count: self.registry.len(),
        }
    }

    /// Remove every entity and cached query. Archetypes and type IDs persist.
    pub fn clear(&mut self) {
        tracing::debug!(entities = self.locations.len(), "clearing store");
        for archetype in &mut self.archetypes {
            archetype.drain(&mut self.pools);
        }
        self.locations.clear();
        self.cache.clear();
        self.cache.end_batch();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn get_or_create_archetype(&mut self, signature: Signature) -> ArchetypeId {
        if let Some(&id) = self.archetype_index.get(&signature) {
            return id;
        }

        let id = self.archetypes.len();
        let capacity = self.config.initial_archetype_capacity;
        let columns = signature
            .ids()
            .iter()
            .map(|&cid| self.registry.new_column(cid, capacity))
            .collect();

        for &cid in signature.ids() {
            self.comp_index.entry(cid).or_default().push(id);
        }
        tracing::debug!(archetype = id, %signature, "created archetype");
        self.archetype_index.insert(signature.clone(), id);
        self.archetypes.push(Archetype::new(id, signature, columns, capacity));
        self.cache.invalidate();
        id
    }

    /// Move `entity`'s row from `from` into `target`, optionally dropping one
    /// component type on the way. Returns the entity's new row.
    fn migrate(
        &mut self,
        entity: Entity,
        from: EntityLocation,
        target: ArchetypeId,
        dropped: Option<ComponentTypeId>,
    ) -> usize {
        let (source, dest) = pair_mut(&mut self.archetypes, from.archetype, target);
        let row = dest.push_entity(entity);
        if let Some(moved) = source.migrate_row(from.row, dest, dropped, &mut self.pools) {
            self.locations.set_row(moved, from.row);
        }
        self.locations.insert(entity, EntityLocation { archetype: target, row });
        row
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrow two distinct archetypes mutably.
fn pair_mut(archetypes: &mut [Archetype], a: usize, b: usize) -> (&mut Archetype, &mut Archetype) {
    debug_assert_ne!(a, b, "migration within a single archetype");
    if a < b {
        let (left, right) = archetypes.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = archetypes.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
