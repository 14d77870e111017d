// column.rs - Type-erased dense component columns
//
// Each archetype holds one column per component type in its signature. The
// archetype machinery only sees `dyn ErasedColumn`; typed access downcasts back
// to `Column<T>`.

use crate::pool::{ComponentPool, ErasedPool};
use std::any::Any;

/// Dense storage for one component type inside one archetype.
#[derive(Debug)]
pub struct Column<T> {
    values: Vec<T>,
}

impl<T> Column<T> {
    /// Column with room for `capacity` rows. The reservation is best effort:
    /// if it cannot be satisfied the column starts empty and grows on demand.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut values = Vec::new();
        if values.try_reserve_exact(capacity).is_err() {
            tracing::warn!(capacity, "column reservation failed, growing on demand");
        }
        Self { values }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    #[inline]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row)
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.values.get_mut(row)
    }

    /// Overwrite a row in place, returning the previous value.
    pub fn replace(&mut self, row: usize, value: T) -> Option<T> {
        self.values
            .get_mut(row)
            .map(|slot| std::mem::replace(slot, value))
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }
}

/// Object-safe column interface used by the archetype store.
///
/// Every row-removing method uses swap-remove: the last row moves into the
/// vacated slot. Callers keep the entity list in lockstep.
pub trait ErasedColumn: Any {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Swap-remove `row` and hand the evicted value to `pool`. The value is
    /// dropped if there is no pool or the pool is full.
    fn swap_remove_recycle(&mut self, row: usize, pool: Option<&mut dyn ErasedPool>);

    /// Swap-remove `row` and append the value to `dst`, which must hold the
    /// same element type.
    fn move_row_to(&mut self, row: usize, dst: &mut dyn ErasedColumn);

    /// Drop every row, recycling values into `pool` while it has room.
    fn drain_recycle(&mut self, pool: Option<&mut dyn ErasedPool>);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedColumn for Column<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn swap_remove_recycle(&mut self, row: usize, pool: Option<&mut dyn ErasedPool>) {
        let value = self.values.swap_remove(row);
        if let Some(pool) = pool.and_then(|p| p.as_any_mut().downcast_mut::<ComponentPool<T>>()) {
            pool.recycle(value);
        }
    }

    fn move_row_to(&mut self, row: usize, dst: &mut dyn ErasedColumn) {
        let value = self.values.swap_remove(row);
        match dst.as_any_mut().downcast_mut::<Column<T>>() {
            Some(dst) => dst.push(value),
            None => debug_assert!(false, "column element type mismatch during migration"),
        }
    }

    fn drain_recycle(&mut self, pool: Option<&mut dyn ErasedPool>) {
        match pool.and_then(|p| p.as_any_mut().downcast_mut::<ComponentPool<T>>()) {
            Some(pool) => {
                for value in self.values.drain(..) {
                    pool.recycle(value);
                }
            }
            None => self.values.clear(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
