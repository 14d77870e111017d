//! Entity handles and row locations
//!
//! Entities are opaque integer handles with no intrinsic data. The store only
//! tracks which archetype row an entity currently occupies.

use crate::ecs::ArchetypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Entity handle (opaque ID)
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity(u64);

impl Entity {
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }

    /// Index usable for dense per-entity tables, `None` if the handle does
    /// not fit the platform's `usize`.
    #[inline]
    pub(crate) fn slot(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an entity currently lives: archetype plus row index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EntityLocation {
    pub archetype: ArchetypeId,
    pub row: usize,
}

/// Entity → location table.
///
/// An entity with no components has no entry. Handles are arbitrary `u64`
/// values, so the table is keyed rather than indexed.
#[derive(Debug, Default)]
pub(crate) struct EntityLocations {
    map: HashMap<Entity, EntityLocation>,
}

impl EntityLocations {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, entity: Entity) -> Option<EntityLocation> {
        self.map.get(&entity).copied()
    }

    pub fn insert(&mut self, entity: Entity, location: EntityLocation) {
        self.map.insert(entity, location);
    }

    /// Patch the row of an entity that was moved by swap-compaction.
    pub fn set_row(&mut self, entity: Entity, row: usize) {
        if let Some(location) = self.map.get_mut(&entity) {
            location.row = row;
        }
    }

    pub fn remove(&mut self, entity: Entity) -> Option<EntityLocation> {
        self.map.remove(&entity)
    }

    /// Number of entities that currently have at least one component.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
