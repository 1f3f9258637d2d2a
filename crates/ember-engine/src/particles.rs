//! Particle emission and lifecycle.
//!
//! A [`ParticleSystem`] is a component: each emitter entity owns its live
//! particles, its [`EmissionProfile`] and a seeded generator, so emission is
//! reproducible for a given seed. [`ParticleUpdateSystem`] drives every
//! emitter once per frame from its entity's [`Transform`].
//!
//! Emission uses a fractional accumulator. Each update adds `dt` to the
//! timer and emits one particle per whole `1 / rate` interval while capacity
//! allows; the remainder carries into the next frame. When capacity is full
//! the timer keeps its value, so spawning resumes as soon as room frees up.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use ember_ecs::entity::Entity;
use ember_ecs::world::World;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{Color, Transform};
use crate::frame::System;
use crate::input::InputState;
use crate::EngineError;

/// System name used for ordering and diagnostics.
pub const PARTICLE_SYSTEM_NAME: &str = "particles";

// ---------------------------------------------------------------------------
// Particle
// ---------------------------------------------------------------------------

/// One live particle. Owned by the emitter that spawned it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians.
    pub rotation: f32,
    /// Radians per second.
    pub angular_velocity: f32,
    /// Seconds left to live.
    pub life: f32,
    pub max_life: f32,
    pub base_size: f32,
    pub size: f32,
    pub color: Color,
}

impl Particle {
    /// Fraction of the lifetime already used, in `0.0..=1.0`.
    pub fn life_ratio(&self) -> f32 {
        if self.max_life > 0.0 {
            (1.0 - self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

// ---------------------------------------------------------------------------
// EmissionProfile
// ---------------------------------------------------------------------------

/// Inclusive range a value is drawn from uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        self.min + (self.max - self.min) * rng.gen::<f32>()
    }
}

/// Tunables for one kind of effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionProfile {
    /// Particles per second for continuous emission. `0` means burst only.
    pub rate: f32,
    /// Half-extent of the spawn box around the origin, per axis.
    pub position_spread: Vec2,
    /// Emission direction in radians (0 is +x, counter-clockwise).
    pub angle: FloatRange,
    pub speed: FloatRange,
    pub lifetime: FloatRange,
    pub size: FloatRange,
    pub rotation: FloatRange,
    pub angular_velocity: FloatRange,
    /// Constant acceleration applied to every particle.
    pub gravity: Vec2,
    /// Linear drag per second.
    pub drag: f32,
    pub start_color: Color,
    pub end_color: Color,
    /// Size multiplier at birth.
    pub start_size: f32,
    /// Size multiplier at death.
    pub end_size: f32,
}

impl Default for EmissionProfile {
    fn default() -> Self {
        Self {
            rate: 10.0,
            position_spread: Vec2::ZERO,
            angle: FloatRange::new(0.0, TAU),
            speed: FloatRange::new(1.0, 2.0),
            lifetime: FloatRange::new(1.0, 2.0),
            size: FloatRange::new(0.1, 0.2),
            rotation: FloatRange::constant(0.0),
            angular_velocity: FloatRange::constant(0.0),
            gravity: Vec2::ZERO,
            drag: 0.0,
            start_color: Color::WHITE,
            end_color: Color::rgba(1.0, 1.0, 1.0, 0.0),
            start_size: 1.0,
            end_size: 1.0,
        }
    }
}

impl EmissionProfile {
    /// Rising flames: upward cone, slight lift, orange fading to dark red.
    pub fn fire() -> Self {
        Self {
            rate: 60.0,
            position_spread: Vec2::new(0.2, 0.05),
            angle: FloatRange::new(FRAC_PI_2 - 0.3, FRAC_PI_2 + 0.3),
            speed: FloatRange::new(1.0, 2.0),
            lifetime: FloatRange::new(0.5, 1.0),
            size: FloatRange::new(0.15, 0.3),
            angular_velocity: FloatRange::new(-1.0, 1.0),
            gravity: Vec2::new(0.0, 1.0),
            drag: 0.5,
            start_color: Color::rgba(1.0, 0.8, 0.2, 1.0),
            end_color: Color::rgba(0.6, 0.1, 0.0, 0.0),
            start_size: 1.0,
            end_size: 0.3,
            ..Default::default()
        }
    }

    /// Slow grey puffs that grow as they fade.
    pub fn smoke() -> Self {
        Self {
            rate: 15.0,
            position_spread: Vec2::new(0.1, 0.1),
            angle: FloatRange::new(FRAC_PI_2 - 0.4, FRAC_PI_2 + 0.4),
            speed: FloatRange::new(0.3, 0.8),
            lifetime: FloatRange::new(2.0, 3.5),
            size: FloatRange::new(0.3, 0.5),
            rotation: FloatRange::new(0.0, TAU),
            angular_velocity: FloatRange::new(-0.5, 0.5),
            gravity: Vec2::new(0.0, 0.2),
            drag: 0.8,
            start_color: Color::rgba(0.5, 0.5, 0.5, 0.6),
            end_color: Color::rgba(0.3, 0.3, 0.3, 0.0),
            start_size: 0.5,
            end_size: 2.0,
        }
    }

    /// Burst-only radial blast with heavy drag.
    pub fn explosion() -> Self {
        Self {
            rate: 0.0,
            angle: FloatRange::new(0.0, TAU),
            speed: FloatRange::new(3.0, 7.0),
            lifetime: FloatRange::new(0.3, 0.8),
            size: FloatRange::new(0.1, 0.25),
            gravity: Vec2::new(0.0, -2.0),
            drag: 2.0,
            start_color: Color::rgba(1.0, 0.9, 0.5, 1.0),
            end_color: Color::rgba(0.8, 0.2, 0.0, 0.0),
            start_size: 1.0,
            end_size: 0.2,
            ..Default::default()
        }
    }

    /// Small twinkling points that drift down.
    pub fn sparkle() -> Self {
        Self {
            rate: 25.0,
            position_spread: Vec2::new(0.5, 0.5),
            angle: FloatRange::new(0.0, TAU),
            speed: FloatRange::new(0.1, 0.5),
            lifetime: FloatRange::new(0.4, 1.2),
            size: FloatRange::new(0.03, 0.08),
            angular_velocity: FloatRange::new(-4.0, 4.0),
            gravity: Vec2::new(0.0, -0.5),
            start_color: Color::rgba(1.0, 1.0, 0.8, 1.0),
            end_color: Color::rgba(1.0, 1.0, 1.0, 0.0),
            start_size: 1.0,
            end_size: 0.0,
            ..Default::default()
        }
    }

    /// Swirling purple motes.
    pub fn magic() -> Self {
        Self {
            rate: 40.0,
            position_spread: Vec2::new(0.3, 0.3),
            angle: FloatRange::new(-PI, PI),
            speed: FloatRange::new(0.5, 1.5),
            lifetime: FloatRange::new(0.8, 1.6),
            size: FloatRange::new(0.05, 0.15),
            rotation: FloatRange::new(0.0, TAU),
            angular_velocity: FloatRange::new(-6.0, 6.0),
            gravity: Vec2::new(0.0, 0.3),
            drag: 1.0,
            start_color: Color::rgba(0.7, 0.3, 1.0, 1.0),
            end_color: Color::rgba(0.2, 0.6, 1.0, 0.0),
            start_size: 0.5,
            end_size: 1.5,
        }
    }
}

// ---------------------------------------------------------------------------
// ParticleSystem
// ---------------------------------------------------------------------------

/// Per-entity emitter state and its live particles.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    profile: EmissionProfile,
    capacity: usize,
    emitting: bool,
    auto_destroy: bool,
    emission_timer: f32,
    rng: Pcg32,
}

impl ParticleSystem {
    /// Create an emitting system whose randomness is fully determined by
    /// `seed`.
    pub fn with_seed(profile: EmissionProfile, capacity: usize, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            profile,
            capacity,
            emitting: true,
            auto_destroy: false,
            emission_timer: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Builder form of [`set_auto_destroy`](Self::set_auto_destroy).
    pub fn auto_destroy(mut self) -> Self {
        self.auto_destroy = true;
        self
    }

    // -- emission control ---------------------------------------------------

    pub fn start(&mut self) {
        self.emitting = true;
    }

    /// Disable further emission; optionally drop every live particle.
    pub fn stop(&mut self, clear_existing: bool) {
        self.emitting = false;
        if clear_existing {
            self.particles.clear();
        }
    }

    pub fn set_auto_destroy(&mut self, auto_destroy: bool) {
        self.auto_destroy = auto_destroy;
    }

    /// Spawn up to `count` particles at `origin` right now, ignoring the
    /// rate timer. Returns how many were spawned.
    pub fn emit_burst(&mut self, count: usize, origin: Vec2) -> usize {
        let spawned = count.min(self.remaining_capacity());
        for _ in 0..spawned {
            self.spawn(origin);
        }
        spawned
    }

    // -- simulation ---------------------------------------------------------

    /// Advance emission and every live particle by `dt` seconds.
    pub fn update(&mut self, dt: f32, origin: Vec2) {
        self.emit_from_timer(dt, origin);

        let profile = &self.profile;
        for p in &mut self.particles {
            p.life -= dt;
            let t = p.life_ratio();
            p.position += p.velocity * dt;
            p.velocity += profile.gravity * dt;
            p.velocity *= 1.0 - profile.drag * dt;
            p.rotation += p.angular_velocity * dt;
            p.color = profile.start_color.lerp(profile.end_color, t);
            p.size = p.base_size * lerp(profile.start_size, profile.end_size, t);
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    fn emit_from_timer(&mut self, dt: f32, origin: Vec2) {
        if !self.emitting || self.profile.rate <= 0.0 || self.remaining_capacity() == 0 {
            return;
        }
        let interval = 1.0 / self.profile.rate;
        self.emission_timer += dt;
        while self.emission_timer >= interval && self.remaining_capacity() > 0 {
            self.spawn(origin);
            self.emission_timer -= interval;
        }
    }

    fn spawn(&mut self, origin: Vec2) {
        let profile = &self.profile;
        let rng = &mut self.rng;

        let spread = profile.position_spread;
        let offset = Vec2::new(
            spread.x * rng.gen_range(-1.0f32..=1.0),
            spread.y * rng.gen_range(-1.0f32..=1.0),
        );
        let angle = profile.angle.sample(rng);
        let speed = profile.speed.sample(rng);
        let life = profile.lifetime.sample(rng);
        let base_size = profile.size.sample(rng);
        let rotation = profile.rotation.sample(rng);
        let angular_velocity = profile.angular_velocity.sample(rng);
        // Fresh random fraction, not zero: particles are born with varied tints.
        let tint = rng.gen::<f32>();

        self.particles.push(Particle {
            position: origin + offset,
            velocity: Vec2::from_angle(angle) * speed,
            rotation,
            angular_velocity,
            life,
            max_life: life,
            base_size,
            size: base_size * profile.start_size,
            color: profile.start_color.lerp(profile.end_color, tint),
        });
    }

    // -- queries ------------------------------------------------------------

    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    pub fn is_auto_destroy(&self) -> bool {
        self.auto_destroy
    }

    /// Not emitting and no live particles.
    pub fn is_finished(&self) -> bool {
        !self.emitting && self.particles.is_empty()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.particles.len())
    }

    pub fn profile(&self) -> &EmissionProfile {
        &self.profile
    }

    /// Unconsumed emission time carried into the next update.
    pub fn emission_timer(&self) -> f32 {
        self.emission_timer
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ---------------------------------------------------------------------------
// ParticleUpdateSystem
// ---------------------------------------------------------------------------

/// Updates every [`ParticleSystem`] and removes finished auto-destroy
/// emitters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleUpdateSystem;

impl System for ParticleUpdateSystem {
    fn name(&self) -> &str {
        PARTICLE_SYSTEM_NAME
    }

    fn update(
        &mut self,
        world: &mut World,
        _input: &dyn InputState,
        dt: f32,
    ) -> Result<(), EngineError> {
        let emitters: Vec<Entity> = world.with::<(ParticleSystem,)>().collect();
        let mut finished = Vec::new();

        for entity in emitters {
            let origin = world
                .try_get::<Transform>(entity)
                .map_or(Vec2::ZERO, |t| t.position);
            let system = world.get_mut::<ParticleSystem>(entity)?;
            system.update(dt, origin);
            if system.is_auto_destroy() && system.is_finished() {
                finished.push(entity);
            }
        }

        for entity in finished {
            debug!(%entity, "particle emitter finished, destroying entity");
            world.destroy_entity(entity)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyboardState;

    fn steady(rate: f32, lifetime: f32) -> EmissionProfile {
        EmissionProfile {
            rate,
            lifetime: FloatRange::constant(lifetime),
            ..Default::default()
        }
    }

    #[test]
    fn capacity_caps_accumulated_emission() {
        let mut system = ParticleSystem::with_seed(steady(10.0, 1.0), 3, 1);
        for _ in 0..7 {
            system.update(0.05, Vec2::ZERO);
        }
        assert_eq!(system.particle_count(), 3);
    }

    #[test]
    fn accumulator_carries_remainder_across_frames() {
        let mut system = ParticleSystem::with_seed(steady(10.0, 5.0), 100, 1);
        // 0.25s at 10/s: two particles, 0.05s left over.
        system.update(0.25, Vec2::ZERO);
        assert_eq!(system.particle_count(), 2);
        system.update(0.06, Vec2::ZERO);
        assert_eq!(system.particle_count(), 3);
    }

    #[test]
    fn full_capacity_preserves_timer() {
        let mut system = ParticleSystem::with_seed(steady(10.0, 5.0), 1, 1);
        system.update(0.1, Vec2::ZERO);
        assert_eq!(system.particle_count(), 1);
        let before = system.emission_timer();
        system.update(0.5, Vec2::ZERO);
        assert_eq!(system.particle_count(), 1);
        assert_eq!(system.emission_timer(), before);
    }

    #[test]
    fn expired_particle_removed_in_same_update() {
        let mut system = ParticleSystem::with_seed(steady(0.0, 0.1), 10, 1);
        system.emit_burst(1, Vec2::ZERO);
        assert_eq!(system.particle_count(), 1);

        system.update(0.15, Vec2::ZERO);
        assert_eq!(system.particle_count(), 0);
        assert!(system.particles().all(|p| p.life > 0.0));
    }

    #[test]
    fn burst_is_bounded_by_capacity() {
        let mut system = ParticleSystem::with_seed(EmissionProfile::explosion(), 30, 9);
        assert_eq!(system.emit_burst(50, Vec2::ZERO), 30);
        assert_eq!(system.particle_count(), 30);
        assert_eq!(system.emit_burst(5, Vec2::ZERO), 0);
    }

    #[test]
    fn stop_optionally_clears() {
        let mut system = ParticleSystem::with_seed(steady(0.0, 1.0), 10, 1);
        system.emit_burst(4, Vec2::ZERO);

        system.stop(false);
        assert!(!system.is_emitting());
        assert_eq!(system.particle_count(), 4);
        assert!(!system.is_finished());

        system.stop(true);
        assert_eq!(system.particle_count(), 0);
        assert!(system.is_finished());

        system.start();
        assert!(!system.is_finished());
    }

    #[test]
    fn stopped_system_does_not_emit() {
        let mut system = ParticleSystem::with_seed(steady(100.0, 1.0), 50, 1);
        system.stop(false);
        system.update(1.0, Vec2::ZERO);
        assert_eq!(system.particle_count(), 0);
    }

    #[test]
    fn spawn_respects_spread_and_origin() {
        let profile = EmissionProfile {
            position_spread: Vec2::new(0.5, 0.25),
            ..steady(0.0, 1.0)
        };
        let mut system = ParticleSystem::with_seed(profile, 200, 3);
        let origin = Vec2::new(2.0, -1.0);
        system.emit_burst(200, origin);
        for p in system.particles() {
            let d = p.position - origin;
            assert!(d.x.abs() <= 0.5 && d.y.abs() <= 0.25);
            let speed = p.velocity.length();
            assert!((1.0 - 1e-4..=2.0 + 1e-4).contains(&speed));
        }
    }

    #[test]
    fn color_and_size_follow_life_ratio() {
        let profile = EmissionProfile {
            start_color: Color::rgba(1.0, 0.0, 0.0, 1.0),
            end_color: Color::rgba(0.0, 0.0, 1.0, 0.0),
            size: FloatRange::constant(2.0),
            start_size: 1.0,
            end_size: 0.0,
            ..steady(0.0, 1.0)
        };
        let mut system = ParticleSystem::with_seed(profile, 1, 5);
        system.emit_burst(1, Vec2::ZERO);
        system.update(0.5, Vec2::ZERO);

        let p = system.particles().next().unwrap();
        assert!((p.life_ratio() - 0.5).abs() < 1e-6);
        assert!((p.color.r - 0.5).abs() < 1e-6);
        assert!((p.color.b - 0.5).abs() < 1e-6);
        assert!((p.size - 1.0).abs() < 1e-6);
    }

    #[test]
    fn motion_integrates_position_before_velocity() {
        let profile = EmissionProfile {
            angle: FloatRange::constant(0.0),
            speed: FloatRange::constant(2.0),
            angular_velocity: FloatRange::constant(1.0),
            gravity: Vec2::new(0.0, -2.0),
            drag: 0.5,
            ..steady(0.0, 1.0)
        };
        let mut system = ParticleSystem::with_seed(profile, 1, 11);
        system.emit_burst(1, Vec2::ZERO);
        system.update(0.1, Vec2::ZERO);

        let p = system.particles().next().unwrap();
        // Position uses the velocity from before this update.
        assert!(p.position.distance(Vec2::new(0.2, 0.0)) < 1e-6);
        // (v0 + g * dt) * (1 - drag * dt)
        let expected = (Vec2::new(2.0, 0.0) + Vec2::new(0.0, -2.0) * 0.1) * (1.0 - 0.5 * 0.1);
        assert!(p.velocity.distance(expected) < 1e-6);
        assert!((p.rotation - 0.1).abs() < 1e-6);
        assert!((p.life - 0.9).abs() < 1e-6);
    }

    #[test]
    fn same_seed_same_particles() {
        let run = |seed| {
            let mut system = ParticleSystem::with_seed(EmissionProfile::magic(), 64, seed);
            for _ in 0..30 {
                system.update(1.0 / 60.0, Vec2::new(1.0, 1.0));
            }
            system.particles().copied().collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn profile_is_kept_as_given() {
        let system = ParticleSystem::with_seed(EmissionProfile::explosion(), 16, 3);
        assert_eq!(system.profile(), &EmissionProfile::explosion());
        assert_eq!(system.profile().rate, 0.0);
    }

    #[test]
    fn update_system_uses_transform_and_auto_destroys() {
        let mut world = World::new();
        let anchored = world.create_entity();
        world
            .add(anchored, Transform::from_position(Vec2::new(3.0, 3.0)))
            .unwrap();
        world
            .add(anchored, ParticleSystem::with_seed(steady(10.0, 5.0), 10, 1))
            .unwrap();

        let doomed = world.create_entity();
        let mut finished = ParticleSystem::with_seed(steady(10.0, 1.0), 10, 2).auto_destroy();
        finished.stop(true);
        world.add(doomed, finished).unwrap();

        let mut system = ParticleUpdateSystem;
        system.update(&mut world, &KeyboardState::new(), 0.1).unwrap();

        assert!(!world.is_entity_active(doomed));
        assert!(world.try_get::<ParticleSystem>(doomed).is_none());

        let emitter = world.get::<ParticleSystem>(anchored).unwrap();
        assert_eq!(emitter.particle_count(), 1);
        let p = emitter.particles().next().unwrap();
        // Spread is zero, so the particle started exactly at the transform.
        assert!(p.position.distance(Vec2::new(3.0, 3.0)) <= 2.0 * 0.1 + 1e-5);
    }
}
