//! Single-threaded frame loop.
//!
//! The [`FrameLoop`] owns the [`World`] and an ordered list of systems. Each
//! frame:
//!
//! 1. The caller has already pumped platform events, so input state is fresh.
//! 2. Every registered system's `update(dt)` runs in registration order,
//!    reading and mutating the world directly.
//! 3. Every `orphan_sweep_interval` frames the world's orphan sweep runs.
//! 4. The frame counter advances; the render collaborator may then read the
//!    world.
//!
//! Systems may rely on the ordering the caller chose and on nothing else.
//! Entity destruction is immediate, so a later system in the same frame
//! never sees a destroyed entity's components.
//!
//! # Example
//!
//! ```
//! use ember_engine::prelude::*;
//!
//! let mut frame_loop = FrameLoop::new(World::new(), FrameConfig::default());
//! frame_loop.add_fn_system("noop", |_world, _input, _dt| Ok(()));
//!
//! let input = KeyboardState::new();
//! frame_loop.run_frames(10, &input).unwrap();
//! assert_eq!(frame_loop.frame_count(), 10);
//! ```

use std::time::{Duration, Instant};

use ember_ecs::world::World;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::FrameConfig;
use crate::input::{InputState, Platform};
use crate::EngineError;

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// A per-frame update unit.
pub trait System {
    /// Unique name, used for ordering constraints and diagnostics.
    fn name(&self) -> &str;

    /// Advance this system by `dt` seconds.
    fn update(
        &mut self,
        world: &mut World,
        input: &dyn InputState,
        dt: f32,
    ) -> Result<(), EngineError>;
}

/// A stateless system as a plain function.
pub type SystemFn = fn(&mut World, &dyn InputState, f32) -> Result<(), EngineError>;

/// Adapter turning a [`SystemFn`] into a [`System`].
struct FnSystem {
    name: String,
    func: SystemFn,
}

impl System for FnSystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(
        &mut self,
        world: &mut World,
        input: &dyn InputState,
        dt: f32,
    ) -> Result<(), EngineError> {
        (self.func)(world, input, dt)
    }
}

/// A system in the loop's list, with the names it must run after.
struct RegisteredSystem {
    system: Box<dyn System>,
    after: Vec<String>,
}

// ---------------------------------------------------------------------------
// FrameDiagnostics
// ---------------------------------------------------------------------------

/// Timing and cleanup figures for the last frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// Wall-clock time per system, in execution order.
    pub system_times: Vec<(String, Duration)>,
    /// Total time for the frame.
    pub total_time: Duration,
    /// Whether the orphan sweep ran this frame.
    pub swept: bool,
    /// Orphaned components removed by this frame's sweep.
    pub orphans_removed: usize,
}

// ---------------------------------------------------------------------------
// FrameLoop
// ---------------------------------------------------------------------------

/// Drives the world forward one frame at a time.
pub struct FrameLoop {
    world: World,
    systems: Vec<RegisteredSystem>,
    frame_counter: u64,
    config: FrameConfig,
    last_diagnostics: FrameDiagnostics,
}

impl FrameLoop {
    /// Create a frame loop around `world`.
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(world: World, config: FrameConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        Self {
            world,
            systems: Vec::new(),
            frame_counter: 0,
            config,
            last_diagnostics: FrameDiagnostics::default(),
        }
    }

    /// Append a system to the end of the execution order.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name is already registered.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.add_system_after(system, &[]);
    }

    /// Append a system that must run after each system named in `after`.
    ///
    /// Execution order is registration order, so every dependency has to be
    /// registered first.
    ///
    /// # Panics
    ///
    /// - If any name in `after` is not already registered.
    /// - If a system with the same name is already registered.
    pub fn add_system_after<S: System + 'static>(&mut self, system: S, after: &[&str]) {
        let name = system.name().to_owned();
        for dep in after {
            assert!(
                self.systems.iter().any(|s| s.system.name() == *dep),
                "system '{name}' must run after '{dep}', but '{dep}' is not registered"
            );
        }
        assert!(
            !self.systems.iter().any(|s| s.system.name() == name),
            "duplicate system name: {name:?}"
        );
        debug!(system = %name, position = self.systems.len(), "registered system");
        self.systems.push(RegisteredSystem {
            system: Box::new(system),
            after: after.iter().map(|s| s.to_string()).collect(),
        });
    }

    /// Register a plain function as a system.
    pub fn add_fn_system(&mut self, name: &str, func: SystemFn) {
        self.add_system(FnSystem {
            name: name.to_owned(),
            func,
        });
    }

    /// Run one frame with the given delta time.
    ///
    /// # Errors
    ///
    /// The first error returned by a system; later systems do not run and
    /// the frame counter does not advance.
    pub fn frame(&mut self, input: &dyn InputState, dt: f32) -> Result<(), EngineError> {
        let frame_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());

        for registered in &mut self.systems {
            let sys_start = Instant::now();
            registered.system.update(&mut self.world, input, dt)?;
            system_times.push((registered.system.name().to_owned(), sys_start.elapsed()));
        }

        self.frame_counter += 1;

        let interval = self.config.orphan_sweep_interval;
        let swept = interval > 0 && self.frame_counter % interval == 0;
        let orphans_removed = if swept {
            self.world.cleanup_destroyed_entities()
        } else {
            0
        };

        self.last_diagnostics = FrameDiagnostics {
            system_times,
            total_time: frame_start.elapsed(),
            swept,
            orphans_removed,
        };
        Ok(())
    }

    /// Run one frame with the configured fixed delta time.
    pub fn step(&mut self, input: &dyn InputState) -> Result<(), EngineError> {
        self.frame(input, self.config.fixed_dt)
    }

    /// Run `count` fixed-dt frames against the same input state.
    pub fn run_frames(&mut self, count: u64, input: &dyn InputState) -> Result<(), EngineError> {
        for _ in 0..count {
            self.step(input)?;
        }
        Ok(())
    }

    /// Run until the platform reports a close request.
    ///
    /// Each iteration pumps platform events, samples the clock once, then
    /// runs a frame. Returns the number of frames run.
    pub fn run<P: Platform, C: Clock>(
        &mut self,
        platform: &mut P,
        clock: &mut C,
    ) -> Result<u64, EngineError> {
        let start = self.frame_counter;
        while platform.pump_events() {
            let dt = clock.delta_time();
            self.frame(&*platform, dt)?;
        }
        let frames = self.frame_counter - start;
        info!(frames, "platform requested close; frame loop stopped");
        Ok(frames)
    }

    // -- accessors ----------------------------------------------------------

    /// Number of frames completed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Read-only access to the world, e.g. for the render collaborator.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world for scene setup and tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Consume the loop and hand back the world.
    pub fn into_world(self) -> World {
        self.world
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Names of all registered systems, in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system.name()).collect()
    }

    /// Names a system was declared to run after.
    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.systems
            .iter()
            .find(|s| s.system.name() == name)
            .map(|s| s.after.as_slice())
    }

    pub fn last_diagnostics(&self) -> &FrameDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
