//! Point-mass movement: player input, gravity, drag, integration and
//! boundary reflection.
//!
//! [`MovementSystem`] holds no per-frame state. Each update runs three passes
//! over the world:
//!
//! 1. **Input**: non-kinematic entities with [`PlayerControl`] and
//!    [`PhysicsBody`] turn the held directional keys into a unit force scaled
//!    by `speed`, then damp their velocity by `1 - drag * dt`.
//! 2. **Integration**: every non-kinematic [`PhysicsBody`] gets gravity (if
//!    enabled), integrates acceleration into velocity, is damped again by
//!    the gentler `1 - drag * dt * integration_drag_scale`, and has its
//!    acceleration reset.
//! 3. **Transform**: entities with [`Transform`] and [`PhysicsBody`] move by
//!    `velocity * dt`. Any axis whose magnitude exceeds its bound is clamped
//!    to the bound and has its velocity negated and damped.
//!
//! The damping factors are not clamped, so `drag * dt > 1` flips velocity.

use ember_ecs::entity::Entity;
use ember_ecs::world::World;
use glam::Vec2;

use crate::components::{PhysicsBody, PlayerControl, Transform};
use crate::config::PhysicsConfig;
use crate::frame::System;
use crate::input::{InputState, KeyCode};
use crate::EngineError;

/// System name used for ordering and diagnostics.
pub const MOVEMENT_SYSTEM_NAME: &str = "movement";

/// Unnormalized direction from the held directional keys (y is up).
pub fn input_direction(input: &dyn InputState) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if input.is_pressed(KeyCode::W) || input.is_pressed(KeyCode::Up) {
        dir.y += 1.0;
    }
    if input.is_pressed(KeyCode::S) || input.is_pressed(KeyCode::Down) {
        dir.y -= 1.0;
    }
    if input.is_pressed(KeyCode::A) || input.is_pressed(KeyCode::Left) {
        dir.x -= 1.0;
    }
    if input.is_pressed(KeyCode::D) || input.is_pressed(KeyCode::Right) {
        dir.x += 1.0;
    }
    dir
}

/// Reflect `position`/`velocity` on one axis against `[-bound, bound]`.
fn reflect_axis(position: &mut f32, velocity: &mut f32, bound: f32, damping: f32) {
    if position.abs() > bound {
        *position = bound.copysign(*position);
        *velocity = -*velocity * damping;
    }
}

/// Player steering, gravity, integration and boundary reflection.
#[derive(Debug, Clone, Default)]
pub struct MovementSystem {
    config: PhysicsConfig,
}

impl MovementSystem {
    pub fn new(config: PhysicsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    fn input_pass(
        &self,
        world: &mut World,
        input: &dyn InputState,
        dt: f32,
    ) -> Result<(), EngineError> {
        let dir = input_direction(input).normalize_or_zero();
        let ids: Vec<Entity> = world.with::<(PlayerControl, PhysicsBody)>().collect();
        for entity in ids {
            let speed = world.get::<PlayerControl>(entity)?.speed;
            let body = world.get_mut::<PhysicsBody>(entity)?;
            if body.is_kinematic {
                continue;
            }
            if dir != Vec2::ZERO {
                body.apply_force(dir * speed);
            }
            body.velocity *= 1.0 - body.drag * dt;
        }
        Ok(())
    }

    fn integration_pass(&self, world: &mut World, dt: f32) -> Result<(), EngineError> {
        let gravity = self.config.gravity;
        let drag_scale = self.config.integration_drag_scale;
        let ids: Vec<Entity> = world.with::<(PhysicsBody,)>().collect();
        for entity in ids {
            let body = world.get_mut::<PhysicsBody>(entity)?;
            if body.is_kinematic {
                continue;
            }
            if body.use_gravity {
                let mass = body.mass;
                body.apply_force(gravity * mass);
            }
            body.velocity += body.acceleration * dt;
            body.velocity *= 1.0 - body.drag * dt * drag_scale;
            body.acceleration = Vec2::ZERO;
        }
        Ok(())
    }

    fn transform_pass(&self, world: &mut World, dt: f32) -> Result<(), EngineError> {
        let PhysicsConfig {
            horizontal_bound,
            vertical_bound,
            bounce_damping,
            ..
        } = self.config;
        // Transform is usually the larger store, so drive from bodies.
        let ids: Vec<Entity> = world.with::<(PhysicsBody, Transform)>().collect();
        for entity in ids {
            let mut velocity = world.get::<PhysicsBody>(entity)?.velocity;
            let transform = world.get_mut::<Transform>(entity)?;
            transform.position += velocity * dt;

            let pos = &mut transform.position;
            reflect_axis(&mut pos.x, &mut velocity.x, horizontal_bound, bounce_damping);
            reflect_axis(&mut pos.y, &mut velocity.y, vertical_bound, bounce_damping);

            world.get_mut::<PhysicsBody>(entity)?.velocity = velocity;
        }
        Ok(())
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        MOVEMENT_SYSTEM_NAME
    }

    fn update(
        &mut self,
        world: &mut World,
        input: &dyn InputState,
        dt: f32,
    ) -> Result<(), EngineError> {
        self.input_pass(world, input, dt)?;
        self.integration_pass(world, dt)?;
        self.transform_pass(world, dt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyboardState;

    fn no_gravity() -> PhysicsConfig {
        PhysicsConfig {
            gravity: Vec2::ZERO,
            ..Default::default()
        }
    }

    fn spawn_body(world: &mut World, position: Vec2, body: PhysicsBody) -> Entity {
        let e = world.create_entity();
        world.add(e, Transform::from_position(position)).unwrap();
        world.add(e, body).unwrap();
        e
    }

    #[test]
    fn reflects_off_horizontal_bound() {
        let mut world = World::new();
        let e = spawn_body(
            &mut world,
            Vec2::new(8.5, 1.0),
            PhysicsBody {
                velocity: Vec2::new(2.0, 0.5),
                ..Default::default()
            },
        );

        let mut system = MovementSystem::new(no_gravity());
        system.update(&mut world, &KeyboardState::new(), 0.1).unwrap();

        let pos = world.get::<Transform>(e).unwrap().position;
        let vel = world.get::<PhysicsBody>(e).unwrap().velocity;
        assert_eq!(pos.x, 8.0);
        assert_eq!(vel.x, -0.8 * 2.0);
        assert_eq!(vel.y, 0.5);
        assert!((pos.y - 1.05).abs() < 1e-6);
    }

    #[test]
    fn reflects_off_negative_vertical_bound() {
        let mut world = World::new();
        let e = spawn_body(
            &mut world,
            Vec2::new(0.0, -4.4),
            PhysicsBody {
                velocity: Vec2::new(0.0, -3.0),
                ..Default::default()
            },
        );

        let mut system = MovementSystem::new(no_gravity());
        system.update(&mut world, &KeyboardState::new(), 0.1).unwrap();

        let pos = world.get::<Transform>(e).unwrap().position;
        let vel = world.get::<PhysicsBody>(e).unwrap().velocity;
        assert_eq!(pos.y, -4.5);
        assert!((vel.y - 2.4).abs() < 1e-6);
    }

    #[test]
    fn gravity_scales_with_mass_and_resets_acceleration() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .add(
                e,
                PhysicsBody {
                    mass: 3.0,
                    use_gravity: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let mut system = MovementSystem::default();
        system.update(&mut world, &KeyboardState::new(), 0.5).unwrap();

        let body = world.get::<PhysicsBody>(e).unwrap();
        // force = g * m, a = force / m = g
        assert!((body.velocity.y - (-9.81 * 0.5)).abs() < 1e-5);
        assert_eq!(body.acceleration, Vec2::ZERO);
    }

    #[test]
    fn kinematic_bodies_skip_integration_but_still_move() {
        let mut world = World::new();
        let e = spawn_body(
            &mut world,
            Vec2::ZERO,
            PhysicsBody {
                velocity: Vec2::new(1.0, 0.0),
                use_gravity: true,
                is_kinematic: true,
                ..Default::default()
            },
        );

        let mut system = MovementSystem::default();
        system.update(&mut world, &KeyboardState::new(), 1.0).unwrap();

        assert_eq!(world.get::<PhysicsBody>(e).unwrap().velocity, Vec2::new(1.0, 0.0));
        assert_eq!(world.get::<Transform>(e).unwrap().position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn kinematic_players_ignore_input() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add(e, PlayerControl::default()).unwrap();
        world
            .add(
                e,
                PhysicsBody {
                    is_kinematic: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let mut input = KeyboardState::new();
        input.press(KeyCode::D);
        let mut system = MovementSystem::new(no_gravity());
        for _ in 0..3 {
            system.update(&mut world, &input, 0.1).unwrap();
        }

        let body = world.get::<PhysicsBody>(e).unwrap();
        assert_eq!(body.acceleration, Vec2::ZERO);
        assert_eq!(body.velocity, Vec2::ZERO);

        // Releasing every key leaves nothing to steer with either.
        input.release_all();
        assert_eq!(input_direction(&input), Vec2::ZERO);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add(e, PlayerControl { speed: 2.0 }).unwrap();
        world.add(e, PhysicsBody::default()).unwrap();

        let mut input = KeyboardState::new();
        input.press(KeyCode::W);
        input.press(KeyCode::D);

        let mut system = MovementSystem::new(no_gravity());
        system.update(&mut world, &input, 1.0).unwrap();

        let vel = world.get::<PhysicsBody>(e).unwrap().velocity;
        assert!((vel.length() - 2.0).abs() < 1e-5);
        assert!((vel.x - vel.y).abs() < 1e-6);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut input = KeyboardState::new();
        input.press(KeyCode::Left);
        input.press(KeyCode::D);
        assert_eq!(input_direction(&input), Vec2::ZERO);
    }

    #[test]
    fn drag_applies_in_both_passes_for_players() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add(e, PlayerControl::default()).unwrap();
        world
            .add(
                e,
                PhysicsBody {
                    velocity: Vec2::new(10.0, 0.0),
                    drag: 1.0,
                    ..Default::default()
                },
            )
            .unwrap();

        let mut system = MovementSystem::new(no_gravity());
        system.update(&mut world, &KeyboardState::new(), 0.1).unwrap();

        // 10 * (1 - 0.1) * (1 - 0.05)
        let vel = world.get::<PhysicsBody>(e).unwrap().velocity;
        assert!((vel.x - 8.55).abs() < 1e-5);
    }

    #[test]
    fn bodies_without_transform_are_integrated_only() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .add(
                e,
                PhysicsBody {
                    velocity: Vec2::new(100.0, 0.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut system = MovementSystem::new(no_gravity());
        system.update(&mut world, &KeyboardState::new(), 1.0).unwrap();

        // No transform, so no boundary reflection either.
        assert_eq!(world.get::<PhysicsBody>(e).unwrap().velocity.x, 100.0);
    }
}
