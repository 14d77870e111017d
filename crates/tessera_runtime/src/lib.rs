//! Tessera Runtime
//!
//! Composes the core store into an update loop:
//! - `World` facade over the allocator and the store
//! - Behavior scheduler with a fixed-step clock
//! - Fluent query builder

pub mod config;
pub mod query;
pub mod scheduler;
pub mod world;

pub use config::RuntimeConfig;
pub use query::QueryBuilder;
pub use scheduler::{Behavior, BehaviorHandle, FixedClock, Scheduler, SchedulerError};
pub use world::{World, WorldError};

pub use tessera_core;
