// archetype.rs - Archetype identification and row storage
//
// An archetype is a unique set of component types. Entities with the same
// component types share one archetype, whose columns are row-aligned with its
// entity list.

use crate::ecs::column::{Column, ErasedColumn};
use crate::ecs::{ComponentTypeId, Entity};
use crate::pool::ComponentPools;
use std::fmt;

/// Index of an archetype in creation (discovery) order.
pub type ArchetypeId = usize;

/// Canonical component set: ascending, deduplicated type IDs.
///
/// Used directly as the archetype key and as the query cache key, so equal
/// sets always hash and compare equal regardless of input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    ids: Vec<ComponentTypeId>,
}

impl Signature {
    /// Build a signature from IDs in any order. Duplicates are removed.
    pub fn from_ids(ids: impl IntoIterator<Item = ComponentTypeId>) -> Self {
        let mut ids: Vec<ComponentTypeId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    pub fn single(id: ComponentTypeId) -> Self {
        Self { ids: vec![id] }
    }

    #[inline]
    pub fn ids(&self) -> &[ComponentTypeId] {
        &self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Position of `id` within the signature, which is also its column index.
    #[inline]
    pub fn index_of(&self, id: ComponentTypeId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    #[inline]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Signature with `id` added, keeping sort order.
    pub fn with(&self, id: ComponentTypeId) -> Self {
        let mut ids = self.ids.clone();
        if let Err(pos) = ids.binary_search(&id) {
            ids.insert(pos, id);
        }
        Self { ids }
    }

    /// Signature with `id` removed.
    pub fn without(&self, id: ComponentTypeId) -> Self {
        let mut ids = self.ids.clone();
        if let Ok(pos) = ids.binary_search(&id) {
            ids.remove(pos);
        }
        Self { ids }
    }

    /// True if every ID in `other` is also in `self`.
    ///
    /// Both sides are sorted, so this is a single merge pass.
    pub fn is_superset_of(&self, other: &Signature) -> bool {
        let mut mine = self.ids.iter();
        'outer: for needle in &other.ids {
            for id in mine.by_ref() {
                if id == needle {
                    continue 'outer;
                }
                if id > needle {
                    return false;
                }
            }
            return false;
        }
        true
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "}}")
    }
}

/// Storage for all entities of a single archetype.
///
/// `columns[i]` holds the component type `signature.ids()[i]`, and row `r` of
/// every column belongs to `entities[r]`.
pub struct Archetype {
    id: ArchetypeId,
    signature: Signature,
    entities: Vec<Entity>,
    columns: Vec<Box<dyn ErasedColumn>>,
}

impl Archetype {
    pub(crate) fn new(
        id: ArchetypeId,
        signature: Signature,
        columns: Vec<Box<dyn ErasedColumn>>,
        capacity: usize,
    ) -> Self {
        debug_assert_eq!(signature.len(), columns.len());
        let mut entities = Vec::new();
        if entities.try_reserve_exact(capacity).is_err() {
            tracing::warn!(archetype = id, capacity, "entity list reservation failed");
        }
        Self {
            id,
            signature,
            entities,
            columns,
        }
    }

    #[inline]
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Member entities, indexed by row.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.signature.contains(id)
    }

    /// Typed view of one column, `None` if the type is not in this archetype.
    pub fn column<T: 'static>(&self, id: ComponentTypeId) -> Option<&[T]> {
        self.typed_column::<T>(id).map(Column::as_slice)
    }

    /// Mutable typed view of one column.
    pub fn column_mut<T: 'static>(&mut self, id: ComponentTypeId) -> Option<&mut [T]> {
        self.typed_column_mut::<T>(id).map(Column::as_mut_slice)
    }

    pub(crate) fn typed_column<T: 'static>(&self, id: ComponentTypeId) -> Option<&Column<T>> {
        let idx = self.signature.index_of(id)?;
        self.columns[idx].as_any().downcast_ref()
    }

    pub(crate) fn typed_column_mut<T: 'static>(
        &mut self,
        id: ComponentTypeId,
    ) -> Option<&mut Column<T>> {
        let idx = self.signature.index_of(id)?;
        self.columns[idx].as_any_mut().downcast_mut()
    }

    pub(crate) fn erased_column_mut(&mut self, id: ComponentTypeId) -> Option<&mut dyn ErasedColumn> {
        let idx = self.signature.index_of(id)?;
        Some(&mut *self.columns[idx])
    }

    /// Append an entity to the row list. The caller must push one value into
    /// every column before the archetype is observed again.
    pub(crate) fn push_entity(&mut self, entity: Entity) -> usize {
        let row = self.entities.len();
        self.entities.push(entity);
        row
    }

    /// Remove `row` by swap-compaction, offering every value to its pool.
    ///
    /// Returns the entity that was moved into `row`, if any.
    pub(crate) fn swap_remove_row(&mut self, row: usize, pools: &mut ComponentPools) -> Option<Entity> {
        for (idx, column) in self.columns.iter_mut().enumerate() {
            column.swap_remove_recycle(row, pools.erased_mut(self.signature.ids[idx]));
        }
        self.remove_entity_row(row)
    }

    /// Move `row` into `target`, which must contain every type of this
    /// archetype except possibly `dropped`. The dropped type's value goes to
    /// its pool.
    ///
    /// Returns the entity that was moved into `row` in this archetype, if any.
    pub(crate) fn migrate_row(
        &mut self,
        row: usize,
        target: &mut Archetype,
        dropped: Option<ComponentTypeId>,
        pools: &mut ComponentPools,
    ) -> Option<Entity> {
        for (idx, column) in self.columns.iter_mut().enumerate() {
            let id = self.signature.ids[idx];
            if Some(id) == dropped {
                column.swap_remove_recycle(row, pools.erased_mut(id));
                continue;
            }
            match target.erased_column_mut(id) {
                Some(dst) => column.move_row_to(row, dst),
                None => {
                    debug_assert!(false, "migration target lacks component {id}");
                    column.swap_remove_recycle(row, pools.erased_mut(id));
                }
            }
        }
        self.remove_entity_row(row)
    }

    /// Empty every row, recycling values. Returns the evicted entities.
    pub(crate) fn drain(&mut self, pools: &mut ComponentPools) -> Vec<Entity> {
        for (idx, column) in self.columns.iter_mut().enumerate() {
            column.drain_recycle(pools.erased_mut(self.signature.ids[idx]));
        }
        std::mem::take(&mut self.entities)
    }

    /// Every column has exactly one value per entity.
    pub(crate) fn is_row_aligned(&self) -> bool {
        self.columns.iter().all(|col| col.len() == self.entities.len())
    }

    fn remove_entity_row(&mut self, row: usize) -> Option<Entity> {
        self.entities.swap_remove(row);
        self.entities.get(row).copied()
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("len", &self.entities.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_sorted_and_deduped() {
        let sig = Signature::from_ids([5, 1, 3, 1]);
        assert_eq!(sig.ids(), &[1, 3, 5]);
        assert_eq!(sig, Signature::from_ids([3, 5, 1]));
        assert_eq!(sig.to_string(), "{1,3,5}");
    }

    #[test]
    fn signature_with_and_without() {
        let sig = Signature::from_ids([2, 8]);
        assert_eq!(sig.with(5).ids(), &[2, 5, 8]);
        assert_eq!(sig.with(2), sig);
        assert_eq!(sig.without(2).ids(), &[8]);
        assert_eq!(sig.without(7), sig);
        assert_eq!(sig.index_of(8), Some(1));
    }

    #[test]
    fn superset_check() {
        let abc = Signature::from_ids([1, 2, 3]);
        assert!(abc.is_superset_of(&Signature::from_ids([1, 3])));
        assert!(abc.is_superset_of(&Signature::from_ids([3])));
        assert!(abc.is_superset_of(&abc));
        assert!(abc.is_superset_of(&Signature::default()));
        assert!(!abc.is_superset_of(&Signature::from_ids([0])));
        assert!(!abc.is_superset_of(&Signature::from_ids([2, 4])));
        assert!(!Signature::from_ids([2]).is_superset_of(&abc));
    }

    fn two_column_archetype() -> Archetype {
        let columns: Vec<Box<dyn ErasedColumn>> = vec![
            Box::new(Column::<u32>::with_capacity(4)),
            Box::new(Column::<&'static str>::with_capacity(4)),
        ];
        Archetype::new(0, Signature::from_ids([0, 1]), columns, 4)
    }

    fn push_row(arch: &mut Archetype, entity: u64, a: u32, b: &'static str) {
        arch.push_entity(Entity::from_raw(entity));
        if let Some(col) = arch.typed_column_mut::<u32>(0) {
            col.push(a);
        }
        if let Some(col) = arch.typed_column_mut::<&'static str>(1) {
            col.push(b);
        }
    }

    #[test]
    fn swap_remove_keeps_rows_aligned() {
        let mut arch = two_column_archetype();
        push_row(&mut arch, 1, 10, "one");
        push_row(&mut arch, 2, 20, "two");
        push_row(&mut arch, 3, 30, "three");

        let mut pools = ComponentPools::new(8);
        pools.ensure::<u32>(0);
        let moved = arch.swap_remove_row(0, &mut pools);

        assert_eq!(moved, Some(Entity::from_raw(3)));
        assert_eq!(arch.entities(), &[Entity::from_raw(3), Entity::from_raw(2)]);
        assert_eq!(arch.column::<u32>(0), Some(&[30, 20][..]));
        assert_eq!(arch.column::<&'static str>(1), Some(&["three", "two"][..]));
        assert!(arch.is_row_aligned());
        assert_eq!(pools.get::<u32>(0).map(|p| p.len()), Some(1));
    }

    #[test]
    fn removing_last_row_moves_nothing() {
        let mut arch = two_column_archetype();
        push_row(&mut arch, 1, 10, "one");
        push_row(&mut arch, 2, 20, "two");

        let mut pools = ComponentPools::new(8);
        assert_eq!(arch.swap_remove_row(1, &mut pools), None);
        assert_eq!(arch.entities(), &[Entity::from_raw(1)]);
    }

    #[test]
    fn wrong_type_column_is_none() {
        let arch = two_column_archetype();
        assert!(arch.column::<u64>(0).is_none());
        assert!(arch.column::<u32>(9).is_none());
    }
}
