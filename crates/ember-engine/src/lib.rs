//! Ember Engine -- real-time 2D simulation on top of the ember ECS.
//!
//! This crate builds on [`ember_ecs`] to provide the per-frame driver and
//! the systems that run inside it: point-mass movement with boundary
//! reflection, seeded particle emitters, and sprite animation. Rendering,
//! windowing and timing are collaborators behind small traits
//! ([`Platform`](input::Platform), [`Clock`](clock::Clock),
//! [`FrameLookup`](render::FrameLookup)); the [`render`] module only
//! extracts read-only draw lists from the world.
//!
//! # Quick Start
//!
//! ```
//! use ember_engine::prelude::*;
//! use glam::Vec2;
//!
//! let config = EngineConfig::default();
//! let mut frame_loop = default_frame_loop(World::new(), &config);
//!
//! let world = frame_loop.world_mut();
//! let ball = world.create_entity();
//! world.add(ball, Transform::from_position(Vec2::new(0.0, 4.0))).unwrap();
//! world.add(ball, PhysicsBody { use_gravity: true, ..Default::default() }).unwrap();
//!
//! frame_loop.run_frames(60, &KeyboardState::new()).unwrap();
//! let y = frame_loop.world().get::<Transform>(ball).unwrap().position.y;
//! assert!(y < 4.0 && y >= -4.5);
//! ```

#![deny(unsafe_code)]

pub mod animation;
pub mod camera;
pub mod clock;
pub mod components;
pub mod config;
pub mod frame;
pub mod input;
pub mod particles;
pub mod physics;
pub mod render;

use ember_ecs::world::World;
use ember_ecs::EcsError;

use crate::animation::AnimationSystem;
use crate::config::EngineConfig;
use crate::frame::FrameLoop;
use crate::particles::{ParticleUpdateSystem, PARTICLE_SYSTEM_NAME};
use crate::physics::{MovementSystem, MOVEMENT_SYSTEM_NAME};

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use ember_ecs;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Errors surfaced by systems and engine-level queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A world operation broke its contract.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// More than one entity carries [`CameraTarget`](components::CameraTarget).
    #[error("expected at most one camera target, found {count}")]
    MultipleCameraTargets { count: usize },
}

/// A frame loop with the standard systems: movement, then particles, then
/// animation.
pub fn default_frame_loop(world: World, config: &EngineConfig) -> FrameLoop {
    let mut frame_loop = FrameLoop::new(world, config.frame.clone());
    frame_loop.add_system(MovementSystem::new(config.physics.clone()));
    frame_loop.add_system_after(ParticleUpdateSystem, &[MOVEMENT_SYSTEM_NAME]);
    frame_loop.add_system_after(AnimationSystem, &[PARTICLE_SYSTEM_NAME]);
    frame_loop
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the ECS prelude.
    pub use ember_ecs::prelude::*;

    pub use crate::animation::AnimationSystem;
    pub use crate::camera::{camera_focus, Camera2D};
    pub use crate::clock::{Clock, FixedClock, WallClock};
    pub use crate::components::{
        AnimatedSprite, CameraTarget, Color, PhysicsBody, PlayerControl, Sprite, Transform,
    };
    pub use crate::config::{ConfigError, EngineConfig, FrameConfig, PhysicsConfig};
    pub use crate::frame::{FrameDiagnostics, FrameLoop, System, SystemFn};
    pub use crate::input::{
        HeadlessPlatform, InputState, KeyCode, KeyEvent, KeyboardState, Platform,
    };
    pub use crate::particles::{
        EmissionProfile, FloatRange, Particle, ParticleSystem, ParticleUpdateSystem,
    };
    pub use crate::physics::MovementSystem;
    pub use crate::render::{
        collect_draw_list, collect_particle_draws, DrawItem, FrameLookup, ParticleDraw,
        SpriteAtlas, UvRect,
    };
    pub use crate::{default_frame_loop, EngineError};
}
