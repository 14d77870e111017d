//! Per-type object pools for component instances evicted from archetypes.
//!
//! Pooling is an optional construction-path optimization: the store pushes
//! removed instances here, callers may pull them back out through
//! `acquire_or_create` instead of allocating fresh values.

mod component_pool;

pub use component_pool::{ComponentPool, ErasedPool};

use crate::ecs::ComponentTypeId;
use std::collections::HashMap;

/// Owns one bounded pool per component type.
pub struct ComponentPools {
    pools: HashMap<ComponentTypeId, Box<dyn ErasedPool>>,
    capacity: usize,
}

impl ComponentPools {
    /// Default per-type cap.
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Self {
        Self {
            pools: HashMap::new(),
            capacity,
        }
    }

    /// Create the pool for `T` if it does not exist yet.
    pub fn ensure<T: 'static>(&mut self, id: ComponentTypeId) {
        let capacity = self.capacity;
        self.pools
            .entry(id)
            .or_insert_with(|| Box::new(ComponentPool::<T>::with_capacity(capacity)));
    }

    /// Typed access to an existing pool.
    pub fn get<T: 'static>(&self, id: ComponentTypeId) -> Option<&ComponentPool<T>> {
        self.pools.get(&id)?.as_any().downcast_ref()
    }

    /// Typed mutable access to an existing pool.
    pub fn get_mut<T: 'static>(&mut self, id: ComponentTypeId) -> Option<&mut ComponentPool<T>> {
        self.pools.get_mut(&id)?.as_any_mut().downcast_mut()
    }

    /// Type-erased access used by columns when they evict a row.
    pub fn erased_mut(&mut self, id: ComponentTypeId) -> Option<&mut dyn ErasedPool> {
        self.pools.get_mut(&id).map(|pool| &mut **pool as &mut dyn ErasedPool)
    }

    /// Per-type cap applied to every pool.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total pooled instances across all types.
    pub fn total_len(&self) -> usize {
        self.pools.values().map(|pool| pool.len()).sum()
    }

    /// Empty every pool; the pools themselves stay registered.
    pub fn clear(&mut self) {
        for pool in self.pools.values_mut() {
            pool.clear();
        }
    }
}

impl Default for ComponentPools {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent() {
        let mut pools = ComponentPools::new(4);
        pools.ensure::<u32>(0);
        if let Some(pool) = pools.get_mut::<u32>(0) {
            pool.recycle(9);
        }
        pools.ensure::<u32>(0);
        assert_eq!(pools.get::<u32>(0).map(ComponentPool::len), Some(1));
    }

    #[test]
    fn wrong_type_downcast_is_none() {
        let mut pools = ComponentPools::default();
        pools.ensure::<u32>(0);
        assert!(pools.get::<String>(0).is_none());
        assert!(pools.get::<u32>(1).is_none());
        assert_eq!(pools.capacity(), ComponentPools::DEFAULT_CAPACITY);
    }

    #[test]
    fn clear_empties_all() {
        let mut pools = ComponentPools::new(4);
        pools.ensure::<u32>(0);
        pools.ensure::<String>(1);
        if let Some(pool) = pools.get_mut::<u32>(0) {
            pool.recycle(1);
        }
        if let Some(pool) = pools.get_mut::<String>(1) {
            pool.recycle("x".to_string());
        }
        assert_eq!(pools.total_len(), 2);
        pools.clear();
        assert_eq!(pools.total_len(), 0);
    }
}
