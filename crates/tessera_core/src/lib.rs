//! Tessera Core
//!
//! In-memory entity-component storage:
//! - Entity id allocation with recycling
//! - Per-store component type registry
//! - Archetype store with swap-compacted columns
//! - Cached multi-component queries with batched invalidation
//! - Bounded per-type component pools

pub mod config;
pub mod ecs;
pub mod pool;

pub use config::{ConfigError, StoreConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
