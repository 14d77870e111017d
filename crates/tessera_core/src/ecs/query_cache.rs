// query_cache.rs - Memoized multi-component query results
//
// Entries are keyed by canonical signature and invalidated (never deleted) on
// structural change. Recomputation happens lazily on the next read.

use crate::ecs::{ArchetypeId, Entity, Signature};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct CacheEntry {
    entities: Vec<Entity>,
    archetypes: Vec<ArchetypeId>,
    dirty: bool,
}

/// Signature-keyed cache of query results with batched invalidation.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<Signature, CacheEntry>,
    batching: bool,
    pending: bool,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request invalidation of every entry. Deferred while a batch is open.
    pub fn invalidate(&mut self) {
        if self.batching {
            self.pending = true;
        } else {
            self.mark_all_dirty();
        }
    }

    /// Start deferring invalidation. Re-entering an open batch is absorbed.
    pub fn begin_batch(&mut self) {
        self.batching = true;
    }

    /// Close the batch and apply one invalidation pass if anything changed.
    pub fn end_batch(&mut self) {
        self.batching = false;
        if std::mem::take(&mut self.pending) {
            tracing::debug!(entries = self.entries.len(), "flushing batched query invalidation");
            self.mark_all_dirty();
        }
    }

    #[inline]
    pub fn is_batching(&self) -> bool {
        self.batching
    }

    /// Whether a batch has recorded an invalidation that is not applied yet.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Return the cached result for `signature`, recomputing it first if the
    /// entry is new or dirty.
    ///
    /// `compute` receives empty output buffers to fill with matching entities
    /// and the archetypes that contributed them.
    pub fn resolve<F>(&mut self, signature: &Signature, compute: F) -> &[Entity]
    where
        F: FnOnce(&Signature, &mut Vec<Entity>, &mut Vec<ArchetypeId>),
    {
        // A read inside a batch must not observe results older than the
        // batch's own mutations; apply the pending pass now.
        if self.pending {
            self.pending = false;
            self.mark_all_dirty();
        }

        if !self.entries.contains_key(signature) {
            self.entries.insert(
                signature.clone(),
                CacheEntry {
                    dirty: true,
                    ..CacheEntry::default()
                },
            );
        }
        let entry = match self.entries.get_mut(signature) {
            Some(entry) => entry,
            None => return &[],
        };
        if entry.dirty {
            entry.entities.clear();
            entry.archetypes.clear();
            compute(signature, &mut entry.entities, &mut entry.archetypes);
            entry.dirty = false;
            tracing::trace!(
                %signature,
                archetypes = entry.archetypes.len(),
                entities = entry.entities.len(),
                "recomputed query"
            );
        }
        &entry.entities
    }

    /// Archetypes that contributed to the last computation for `signature`.
    pub fn contributing_archetypes(&self, signature: &Signature) -> Option<&[ArchetypeId]> {
        self.entries.get(signature).map(|entry| entry.archetypes.as_slice())
    }

    /// `Some(dirty)` if an entry exists for `signature`.
    pub fn is_dirty(&self, signature: &Signature) -> Option<bool> {
        self.entries.get(signature).map(|entry| entry.dirty)
    }

    /// Number of cached queries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Batch state is left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn mark_all_dirty(&mut self) {
        for entry in self.entries.values_mut() {
            entry.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(values: &'static [u64]) -> impl FnOnce(&Signature, &mut Vec<Entity>, &mut Vec<ArchetypeId>) {
        move |_: &Signature, entities: &mut Vec<Entity>, archetypes: &mut Vec<ArchetypeId>| {
            entities.extend(values.iter().map(|&v| Entity::from_raw(v)));
            archetypes.push(0);
        }
    }

    #[test]
    fn first_read_computes_then_caches() {
        let mut cache = QueryCache::new();
        let sig = Signature::from_ids([1]);

        assert_eq!(cache.resolve(&sig, fill(&[1, 2])).len(), 2);
        assert_eq!(cache.is_dirty(&sig), Some(false));
        assert_eq!(cache.contributing_archetypes(&sig), Some(&[0][..]));

        // Clean entry: compute must not run.
        let result = cache.resolve(&sig, |_, _, _| panic!("recomputed a clean entry"));
        assert_eq!(result, &[Entity::from_raw(1), Entity::from_raw(2)]);
    }

    #[test]
    fn invalidate_marks_dirty_lazily() {
        let mut cache = QueryCache::new();
        let sig = Signature::from_ids([1, 2]);
        cache.resolve(&sig, fill(&[1]));

        cache.invalidate();
        assert_eq!(cache.is_dirty(&sig), Some(true));
        assert_eq!(cache.resolve(&sig, fill(&[4, 5])), &[Entity::from_raw(4), Entity::from_raw(5)]);
    }

    #[test]
    fn batch_defers_until_end() {
        let mut cache = QueryCache::new();
        let sig = Signature::from_ids([3]);
        cache.resolve(&sig, fill(&[1]));

        cache.begin_batch();
        cache.begin_batch();
        cache.invalidate();
        cache.invalidate();
        assert!(cache.has_pending());
        assert_eq!(cache.is_dirty(&sig), Some(false));

        cache.end_batch();
        assert!(!cache.is_batching());
        assert!(!cache.has_pending());
        assert_eq!(cache.is_dirty(&sig), Some(true));
    }

    #[test]
    fn empty_batch_leaves_entries_clean() {
        let mut cache = QueryCache::new();
        let sig = Signature::from_ids([3]);
        cache.resolve(&sig, fill(&[1]));

        cache.begin_batch();
        cache.end_batch();
        assert_eq!(cache.is_dirty(&sig), Some(false));
    }

    #[test]
    fn read_inside_batch_sees_pending_changes() {
        let mut cache = QueryCache::new();
        let sig = Signature::from_ids([3]);
        cache.resolve(&sig, fill(&[1]));

        cache.begin_batch();
        cache.invalidate();
        assert_eq!(cache.resolve(&sig, fill(&[9])), &[Entity::from_raw(9)]);
        assert!(cache.is_batching());
    }

    #[test]
    fn clear_drops_entries() {
        let mut cache = QueryCache::new();
        cache.resolve(&Signature::from_ids([1]), fill(&[1]));
        cache.resolve(&Signature::from_ids([2]), fill(&[1]));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
