//! Flip-book sprite animation.

use ember_ecs::entity::Entity;
use ember_ecs::world::World;

use crate::components::AnimatedSprite;
use crate::frame::System;
use crate::input::InputState;
use crate::EngineError;

/// System name used for ordering and diagnostics.
pub const ANIMATION_SYSTEM_NAME: &str = "animation";

/// Advances every [`AnimatedSprite`] by the frame's delta time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationSystem;

impl System for AnimationSystem {
    fn name(&self) -> &str {
        ANIMATION_SYSTEM_NAME
    }

    fn update(
        &mut self,
        world: &mut World,
        _input: &dyn InputState,
        dt: f32,
    ) -> Result<(), EngineError> {
        let ids: Vec<Entity> = world.with::<(AnimatedSprite,)>().collect();
        for entity in ids {
            world.get_mut::<AnimatedSprite>(entity)?.advance(dt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyboardState;
    use glam::Vec2;

    #[test]
    fn advances_every_animation() {
        let mut world = World::new();
        let looping = world.create_entity();
        world
            .add(
                looping,
                AnimatedSprite::new(vec!["a".into(), "b".into()], 0.1, Vec2::ONE),
            )
            .unwrap();
        let once = world.create_entity();
        world
            .add(
                once,
                AnimatedSprite::new(vec!["x".into(), "y".into()], 0.1, Vec2::ONE).once(),
            )
            .unwrap();

        let mut system = AnimationSystem;
        let input = KeyboardState::new();
        system.update(&mut world, &input, 0.15).unwrap();
        assert_eq!(world.get::<AnimatedSprite>(looping).unwrap().current_frame, 1);

        system.update(&mut world, &input, 0.1).unwrap();
        assert_eq!(world.get::<AnimatedSprite>(looping).unwrap().current_frame, 0);
        let one_shot = world.get::<AnimatedSprite>(once).unwrap();
        assert_eq!(one_shot.current_frame, 1);
        assert!(one_shot.finished);
    }
}
