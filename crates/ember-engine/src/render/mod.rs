//! Render extraction: the read-only boundary between the world and a
//! renderer.
//!
//! Nothing here talks to a GPU. The functions walk the world once per frame
//! and produce plain draw lists that any backend can consume:
//!
//! 1. [`collect_draw_list`] gathers every `(Transform, Sprite)` and
//!    `(Transform, AnimatedSprite)` pair into [`DrawItem`]s, sorted by
//!    ascending layer. Equal layers keep no particular relative order.
//! 2. [`collect_particle_draws`] flattens the live particles of every
//!    [`ParticleSystem`] into [`ParticleDraw`]s.
//! 3. [`pack_instances`] resolves frame names through a [`FrameLookup`] and
//!    packs the result into GPU-ready [`SpriteInstance`] records.
//!
//! The world is only ever borrowed immutably.

pub mod atlas;
pub mod instance;

pub use atlas::{FrameLookup, SpriteAtlas, UvRect};
pub use instance::{instances_as_bytes, SpriteInstance};

use ember_ecs::entity::Entity;
use ember_ecs::world::World;
use glam::Vec2;

use crate::components::{AnimatedSprite, Color, Sprite, Transform};
use crate::particles::ParticleSystem;

// ---------------------------------------------------------------------------
// DrawItem
// ---------------------------------------------------------------------------

/// One sprite to draw, centered on `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub entity: Entity,
    pub position: Vec2,
    /// Radians.
    pub rotation: f32,
    pub scale: Vec2,
    /// Full extents before `scale` is applied.
    pub size: Vec2,
    pub color: Color,
    pub layer: i32,
    /// Sprite-sheet frame name. `None` for an animation with no frames.
    pub frame: Option<String>,
}

impl DrawItem {
    /// Full extents after scaling.
    pub fn world_size(&self) -> Vec2 {
        self.size * self.scale
    }
}

/// Gather every drawable entity, sorted by ascending layer.
pub fn collect_draw_list(world: &World) -> Vec<DrawItem> {
    let mut items = Vec::new();

    for (entity, (sprite, transform)) in world.query::<(Sprite, Transform)>() {
        items.push(DrawItem {
            entity,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            size: sprite.size,
            color: sprite.color,
            layer: sprite.layer,
            frame: Some(sprite.frame.clone()),
        });
    }

    for (entity, (anim, transform)) in world.query::<(AnimatedSprite, Transform)>() {
        items.push(DrawItem {
            entity,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            size: anim.size,
            color: anim.color,
            layer: anim.layer,
            frame: anim.current_frame_name().map(str::to_owned),
        });
    }

    items.sort_by_key(|item| item.layer);
    items
}

// ---------------------------------------------------------------------------
// ParticleDraw
// ---------------------------------------------------------------------------

/// One particle to draw as a colored quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleDraw {
    pub emitter: Entity,
    pub position: Vec2,
    pub rotation: f32,
    pub size: f32,
    pub color: Color,
}

/// Flatten every live particle of every emitter.
pub fn collect_particle_draws(world: &World) -> Vec<ParticleDraw> {
    let mut draws = Vec::new();
    for (emitter, (system,)) in world.query::<(ParticleSystem,)>() {
        draws.extend(system.particles().map(|p| ParticleDraw {
            emitter,
            position: p.position,
            rotation: p.rotation,
            size: p.size,
            color: p.color,
        }));
    }
    draws
}

// ---------------------------------------------------------------------------
// Instance packing
// ---------------------------------------------------------------------------

/// Resolve frames and pack a draw list into instance records.
///
/// Frames the lookup does not know (and animations with no frames) get
/// `missing`; choosing that fallback is the caller's decision.
pub fn pack_instances(
    items: &[DrawItem],
    frames: &dyn FrameLookup,
    missing: UvRect,
) -> Vec<SpriteInstance> {
    items
        .iter()
        .map(|item| {
            let uv = item
                .frame
                .as_deref()
                .and_then(|name| frames.lookup(name))
                .unwrap_or(missing);
            SpriteInstance::new(item.position, item.world_size(), item.rotation, item.color, uv)
        })
        .collect()
}

/// Pack particles as untextured quads covering the whole of `uv`.
pub fn pack_particle_instances(draws: &[ParticleDraw], uv: UvRect) -> Vec<SpriteInstance> {
    draws
        .iter()
        .map(|d| SpriteInstance::new(d.position, Vec2::splat(d.size), d.rotation, d.color, uv))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::EmissionProfile;

    fn spawn_sprite(world: &mut World, frame: &str, layer: i32, x: f32) -> Entity {
        let e = world.create_entity();
        world
            .add(e, Transform::from_position(Vec2::new(x, 0.0)))
            .unwrap();
        world
            .add(e, Sprite::new(frame, Vec2::ONE).with_layer(layer))
            .unwrap();
        e
    }

    #[test]
    fn draw_list_sorted_by_layer() {
        let mut world = World::new();
        spawn_sprite(&mut world, "tree", 5, 0.0);
        spawn_sprite(&mut world, "ground", -1, 1.0);
        spawn_sprite(&mut world, "player", 2, 2.0);

        let e = world.create_entity();
        world.add(e, Transform::default()).unwrap();
        world
            .add(
                e,
                AnimatedSprite::new(vec!["bird_0".into()], 0.1, Vec2::ONE).with_layer(3),
            )
            .unwrap();

        let layers: Vec<i32> = collect_draw_list(&world).iter().map(|i| i.layer).collect();
        assert_eq!(layers, vec![-1, 2, 3, 5]);
    }

    #[test]
    fn entities_without_transform_are_skipped() {
        let mut world = World::new();
        spawn_sprite(&mut world, "a", 0, 0.0);
        let floating = world.create_entity();
        world.add(floating, Sprite::new("b", Vec2::ONE)).unwrap();

        let items = collect_draw_list(&world);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].frame.as_deref(), Some("a"));
    }

    #[test]
    fn animated_sprite_reports_current_frame() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add(e, Transform::default()).unwrap();
        let mut anim = AnimatedSprite::new(vec!["f0".into(), "f1".into()], 0.1, Vec2::ONE);
        anim.advance(0.15);
        world.add(e, anim).unwrap();

        let items = collect_draw_list(&world);
        assert_eq!(items[0].frame.as_deref(), Some("f1"));
    }

    #[test]
    fn destroyed_entities_are_not_drawn() {
        let mut world = World::new();
        let e = spawn_sprite(&mut world, "a", 0, 0.0);
        world.destroy_entity(e).unwrap();
        assert!(collect_draw_list(&world).is_empty());
    }

    #[test]
    fn unknown_frames_use_caller_fallback() {
        let mut world = World::new();
        spawn_sprite(&mut world, "known", 0, 0.0);
        spawn_sprite(&mut world, "unknown", 1, 0.0);

        let mut atlas = SpriteAtlas::new();
        let known = UvRect::new(0.0, 0.0, 0.5, 0.5);
        atlas.insert("known", known);

        let instances = pack_instances(&collect_draw_list(&world), &atlas, UvRect::FULL);
        assert_eq!(instances[0].uv, known.to_array());
        assert_eq!(instances[1].uv, UvRect::FULL.to_array());
    }

    #[test]
    fn particle_draws_cover_every_emitter() {
        let mut world = World::new();
        for seed in 0..3 {
            let e = world.create_entity();
            let mut system = ParticleSystem::with_seed(EmissionProfile::explosion(), 8, seed);
            system.emit_burst(4, Vec2::ZERO);
            world.add(e, system).unwrap();
        }
        let draws = collect_particle_draws(&world);
        assert_eq!(draws.len(), 12);
        assert_eq!(pack_particle_instances(&draws, UvRect::FULL).len(), 12);
    }
}
