// allocator.rs - Entity handle allocation with a LIFO recycling freelist
//
// The allocator knows nothing about components. Callers that own a store must
// strip an entity's components before destroying it so a recycled handle never
// inherits stale data.

use crate::ecs::Entity;

/// Issues and recycles entity handles.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
    recycled: Vec<Entity>,
    alive: Vec<bool>,
}

impl EntityAllocator {
    /// First handle value issued by a fresh (or cleared) allocator.
    pub const FIRST_ID: u64 = 1;

    pub fn new() -> Self {
        Self {
            next_id: Self::FIRST_ID,
            recycled: Vec::new(),
            alive: Vec::new(),
        }
    }

    /// Hand out a handle, preferring the most recently destroyed one.
    pub fn create(&mut self) -> Entity {
        let entity = match self.recycled.pop() {
            Some(entity) => entity,
            None => {
                let entity = Entity::from_raw(self.next_id);
                self.next_id += 1;
                entity
            }
        };
        self.set_alive(entity, true);
        entity
    }

    /// Mark a handle dead and queue it for reuse. Destroying a dead handle is a no-op.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.exists(entity) {
            return false;
        }
        self.set_alive(entity, false);
        self.recycled.push(entity);
        true
    }

    pub fn exists(&self, entity: Entity) -> bool {
        entity
            .slot()
            .and_then(|idx| self.alive.get(idx).copied())
            .unwrap_or(false)
    }

    /// Number of live handles.
    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|alive| **alive).count()
    }

    /// Number of handles waiting to be reused.
    pub fn recycled_count(&self) -> usize {
        self.recycled.len()
    }

    /// Reset to the freshly constructed state.
    pub fn clear(&mut self) {
        self.next_id = Self::FIRST_ID;
        self.recycled.clear();
        self.alive.clear();
    }

    // Only handles issued by `create` reach here, and those are dense.
    fn set_alive(&mut self, entity: Entity, alive: bool) {
        let Some(idx) = entity.slot() else {
            return;
        };
        if self.alive.len() <= idx {
            self.alive.resize(idx + 1, false);
        }
        self.alive[idx] = alive;
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
