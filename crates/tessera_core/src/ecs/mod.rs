//! Archetype-based entity-component storage.
//!
//! Entities carrying the same set of component types share an archetype whose
//! columns are dense, row-aligned arrays. The [`Store`] owns every archetype,
//! migrates entities between them as their component sets change, and serves
//! multi-component queries through a lazily recomputed cache.

mod allocator;
mod archetype;
mod column;
mod component;
mod entity;
mod query_cache;
mod registry;
mod store;

pub use allocator::EntityAllocator;
pub use archetype::{Archetype, ArchetypeId, Signature};
pub use component::{Component, ComponentType, ComponentTypeId};
pub use entity::{Entity, EntityLocation};
pub use query_cache::QueryCache;
pub use registry::{ComponentInfo, TypeRegistry};
pub use store::{Store, StoreStats};
