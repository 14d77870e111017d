//! Tessera demo runtime
//!
//! Spawns a crowd of moving entities, registers a couple of behaviors and runs
//! a few frames of the update loop.

use anyhow::Result;
use tessera_core::define_component;
use tessera_runtime::{Behavior, RuntimeConfig, Scheduler, World};

const ENTITY_COUNT: u64 = 2_000;
const FRAMES: u32 = 10;
const FRAME_DT: f32 = 1.0 / 30.0;

#[derive(Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}
define_component!(Position);

#[derive(Debug, Clone, Copy)]
struct Velocity {
    dx: f32,
    dy: f32,
}
define_component!(Velocity);

#[derive(Debug, Clone, Copy)]
struct Frozen;
define_component!(Frozen);

/// Integrates velocity into position on every fixed step.
struct Movement;

impl Behavior for Movement {
    fn name(&self) -> &str {
        "movement"
    }

    fn on_fixed_tick(&mut self, world: &mut World, fixed_dt: f32) {
        let movers = world.query().with::<Position>().with::<Velocity>().entities();
        for entity in movers {
            if world.has::<Frozen>(entity) {
                continue;
            }
            let Some(velocity) = world.get::<Velocity>(entity).copied() else {
                continue;
            };
            if let Some(position) = world.get_mut::<Position>(entity) {
                position.x += velocity.dx * fixed_dt;
                position.y += velocity.dy * fixed_dt;
            }
        }
    }
}

/// Freezes entities that wander out of bounds, in one batch per frame.
struct Fence {
    limit: f32,
}

impl Behavior for Fence {
    fn name(&self) -> &str {
        "fence"
    }

    fn on_tick(&mut self, world: &mut World, _dt: f32) {
        let positioned = world.query().with::<Position>().entities();
        let limit = self.limit;
        let frozen = world.batch(|world| {
            let mut frozen = 0;
            for entity in positioned {
                let outside = world
                    .get::<Position>(entity)
                    .is_some_and(|p| p.x.abs() > limit || p.y.abs() > limit);
                if outside && !world.has::<Frozen>(entity) && world.insert(entity, Frozen).is_ok() {
                    frozen += 1;
                }
            }
            frozen
        });
        if frozen > 0 {
            tracing::debug!(frozen, "entities left the fence");
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Tessera v{}", tessera_core::VERSION);

    let config = RuntimeConfig::default();
    config.validate()?;

    let mut world = World::with_config(config.store.clone())?;
    let mut scheduler = Scheduler::with_config(&config);

    world.batch(|world| -> Result<()> {
        for i in 0..ENTITY_COUNT {
            let entity = world.spawn();
            let t = i as f32;
            world.insert(entity, Position { x: 0.0, y: 0.0 })?;
            if i % 4 != 0 {
                world.insert(entity, Velocity { dx: t.cos() * 10.0, dy: t.sin() * 10.0 })?;
            }
        }
        Ok(())
    })?;
    tracing::info!(entities = world.entity_count(), "spawned");

    scheduler.register(&mut world, Box::new(Movement))?;
    scheduler.register(&mut world, Box::new(Fence { limit: 2.5 }))?;

    for frame in 0..FRAMES {
        let steps = scheduler.advance(&mut world, FRAME_DT);
        tracing::debug!(frame, steps, "frame complete");
    }

    let stats = world.stats();
    tracing::info!(
        archetypes = stats.archetype_count,
        live = stats.live_entity_count,
        cached_queries = stats.cached_query_count,
        component_types = stats.component_type_count,
        frozen = world.query_one::<Frozen>().len(),
        simulated_secs = scheduler.clock().simulated_secs(),
        "run complete"
    );
    tracing::info!("stats: {}", serde_json::to_string(&stats)?);

    Ok(())
}
