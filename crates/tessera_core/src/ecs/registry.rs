// registry.rs - Per-store component type registry
//
// Unlike a process-wide registry, every store owns its own table so two stores
// never collide. IDs are dense, assigned on first use and never reclaimed.

use crate::ecs::column::{Column, ErasedColumn};
use crate::ecs::{Component, ComponentType, ComponentTypeId};
use std::any::TypeId;
use std::collections::HashMap;

/// Metadata recorded for each registered component type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: ComponentTypeId,
    pub name: &'static str,
    pub type_id: TypeId,
}

type ColumnFactory = fn(usize) -> Box<dyn ErasedColumn>;

#[derive(Default)]
pub struct TypeRegistry {
    by_type: HashMap<TypeId, ComponentTypeId>,
    infos: Vec<ComponentInfo>,
    factories: Vec<ColumnFactory>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ID for `T`, allocating the next one on first use.
    pub fn id_for<T: Component>(&mut self) -> ComponentType<T> {
        if let Some(id) = self.lookup::<T>() {
            return id;
        }
        let id = self.infos.len() as ComponentTypeId;
        self.infos.push(ComponentInfo {
            id,
            name: T::NAME,
            type_id: TypeId::of::<T>(),
        });
        self.factories.push(new_column::<T>);
        self.by_type.insert(TypeId::of::<T>(), id);
        ComponentType::new(id)
    }

    /// Return the ID for `T` only if it was registered before.
    pub fn lookup<T: Component>(&self) -> Option<ComponentType<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|&id| ComponentType::new(id))
    }

    pub fn info(&self, id: ComponentTypeId) -> Option<&ComponentInfo> {
        self.infos.get(id as usize)
    }

    /// Empty column for a registered type.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this registry.
    pub(crate) fn new_column(&self, id: ComponentTypeId, capacity: usize) -> Box<dyn ErasedColumn> {
        (self.factories[id as usize])(capacity)
    }

    /// Number of distinct types seen so far.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.infos.iter()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry").field("types", &self.infos).finish()
    }
}

fn new_column<T: 'static>(capacity: usize) -> Box<dyn ErasedColumn> {
    Box::new(Column::<T>::with_capacity(capacity))
}
