// scheduler.rs - Per-tick behavior scheduling
//
// Behaviors run in registration order. Each hook is called once per tick; the
// fixed-step hook is driven by an accumulator clock so simulation steps stay a
// constant length regardless of frame time.

use crate::config::RuntimeConfig;
use crate::world::World;
use std::fmt;
use thiserror::Error;

/// A unit of per-tick logic. Every hook defaults to a no-op.
pub trait Behavior {
    /// Unique name used to reject duplicate registration.
    fn name(&self) -> &str;

    fn on_attach(&mut self, _world: &mut World) {}

    fn on_detach(&mut self, _world: &mut World) {}

    fn on_tick(&mut self, _world: &mut World, _dt: f32) {}

    fn on_fixed_tick(&mut self, _world: &mut World, _fixed_dt: f32) {}
}

/// Handle assigned to each registered behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BehaviorHandle(u32);

impl BehaviorHandle {
    /// Return the raw value backing this handle.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BehaviorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur while registering or removing behaviors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("behavior '{name}' is already registered")]
    DuplicateBehavior { name: String },

    #[error("no behavior registered under handle {handle}")]
    UnknownBehavior { handle: BehaviorHandle },
}

/// Accumulates frame time into whole fixed steps.
#[derive(Debug, Clone)]
pub struct FixedClock {
    fixed_dt: f32,
    max_steps: u32,
    accumulator: f32,
    tick_count: u64,
    simulated_secs: f64,
}

impl FixedClock {
    pub fn new(fixed_dt: f32, max_steps: u32) -> Self {
        Self {
            fixed_dt,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            tick_count: 0,
            simulated_secs: 0.0,
        }
    }

    /// Add `frame_dt` seconds and return how many fixed steps are due.
    ///
    /// At most `max_steps` are returned; any backlog beyond that is discarded
    /// so a slow frame cannot snowball into ever longer catch-up.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.fixed_dt && steps < self.max_steps {
            self.accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.fixed_dt {
            tracing::debug!(
                backlog_secs = self.accumulator,
                "fixed step budget exhausted, dropping backlog"
            );
            self.accumulator %= self.fixed_dt;
        }
        self.tick_count += u64::from(steps);
        self.simulated_secs += f64::from(self.fixed_dt) * f64::from(steps);
        steps
    }

    #[inline]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Fixed steps produced so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated time covered by those steps, in seconds.
    #[inline]
    pub fn simulated_secs(&self) -> f64 {
        self.simulated_secs
    }

    /// Fraction of a fixed step left in the accumulator, for interpolation.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.fixed_dt
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        let config = RuntimeConfig::default();
        Self::new(config.fixed_timestep_secs, config.max_fixed_steps_per_frame)
    }
}

struct RegisteredBehavior {
    handle: BehaviorHandle,
    behavior: Box<dyn Behavior>,
}

/// Runs registered behaviors in registration order.
#[derive(Default)]
pub struct Scheduler {
    behaviors: Vec<RegisteredBehavior>,
    next_handle: u32,
    clock: FixedClock,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &RuntimeConfig) -> Self {
        Self {
            behaviors: Vec::new(),
            next_handle: 0,
            clock: FixedClock::new(config.fixed_timestep_secs, config.max_fixed_steps_per_frame),
        }
    }

    /// Register a behavior and call its `on_attach` hook.
    ///
    /// A behavior whose name is already registered is rejected and the
    /// scheduler is left unchanged.
    pub fn register(
        &mut self,
        world: &mut World,
        mut behavior: Box<dyn Behavior>,
    ) -> Result<BehaviorHandle, SchedulerError> {
        let name = behavior.name();
        if self.behaviors.iter().any(|b| b.behavior.name() == name) {
            tracing::warn!(behavior = name, "behavior already registered, ignoring");
            return Err(SchedulerError::DuplicateBehavior {
                name: name.to_string(),
            });
        }

        let handle = BehaviorHandle(self.next_handle);
        self.next_handle += 1;
        behavior.on_attach(world);
        self.behaviors.push(RegisteredBehavior { handle, behavior });
        Ok(handle)
    }

    /// Remove a behavior, calling its `on_detach` hook exactly once.
    pub fn deregister(
        &mut self,
        world: &mut World,
        handle: BehaviorHandle,
    ) -> Result<Box<dyn Behavior>, SchedulerError> {
        let idx = self
            .behaviors
            .iter()
            .position(|b| b.handle == handle)
            .ok_or(SchedulerError::UnknownBehavior { handle })?;
        let mut entry = self.behaviors.remove(idx);
        entry.behavior.on_detach(world);
        Ok(entry.behavior)
    }

    /// Call `on_tick` on every behavior.
    pub fn tick(&mut self, world: &mut World, dt: f32) {
        for entry in &mut self.behaviors {
            entry.behavior.on_tick(world, dt);
        }
    }

    /// Call `on_fixed_tick` on every behavior.
    pub fn fixed_tick(&mut self, world: &mut World, fixed_dt: f32) {
        for entry in &mut self.behaviors {
            entry.behavior.on_fixed_tick(world, fixed_dt);
        }
    }

    /// Advance one frame: run every due fixed step, then one variable tick.
    /// Returns the number of fixed steps run.
    pub fn advance(&mut self, world: &mut World, frame_dt: f32) -> u32 {
        let steps = self.clock.accumulate(frame_dt);
        let fixed_dt = self.clock.fixed_dt();
        for _ in 0..steps {
            self.fixed_tick(world, fixed_dt);
        }
        self.tick(world, frame_dt);
        steps
    }

    pub fn clock(&self) -> &FixedClock {
        &self.clock
    }

    pub fn contains(&self, handle: BehaviorHandle) -> bool {
        self.behaviors.iter().any(|b| b.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Registered behavior names in run order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.behaviors.iter().map(|b| b.behavior.name())
    }
}
