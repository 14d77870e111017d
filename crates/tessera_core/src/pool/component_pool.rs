// component_pool.rs - Bounded per-type freelist of component instances
//
// Pools are stored type-erased next to each other; typed access downcasts
// through `ErasedPool::as_any_mut`.

use std::any::Any;

/// Bounded LIFO freelist of component instances evicted from archetypes.
///
/// Once `capacity` instances are held, further recycles are dropped so a burst
/// of removals cannot pin unbounded memory.
#[derive(Debug)]
pub struct ComponentPool<T> {
    items: Vec<T>,
    capacity: usize,
    dropped: usize,
}

impl<T> ComponentPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Offer an instance to the pool. Returns `false` if the pool was full and
    /// the instance was dropped.
    pub fn recycle(&mut self, value: T) -> bool {
        if self.items.len() >= self.capacity {
            self.dropped += 1;
            tracing::trace!(
                capacity = self.capacity,
                "component pool full, dropping instance"
            );
            return false;
        }
        self.items.push(value);
        true
    }

    /// Pop the most recently recycled instance.
    #[inline]
    pub fn acquire(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Reuse a pooled instance or build a fresh one.
    pub fn acquire_or_create(&mut self, factory: impl FnOnce() -> T) -> T {
        self.acquire().unwrap_or_else(factory)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Instances discarded because the pool was full.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Object-safe view of a `ComponentPool<T>` so pools for different types can
/// share one table. Typed access goes through `as_any_mut` downcasts.
pub trait ErasedPool: Any {
    fn len(&self) -> usize;
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedPool for ComponentPool<T> {
    fn len(&self) -> usize {
        ComponentPool::len(self)
    }

    fn clear(&mut self) {
        ComponentPool::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
