//! Camera following.
//!
//! At most one entity may carry [`CameraTarget`]. [`camera_focus`] reports a
//! violation as an error instead of picking one target by query order.

use ember_ecs::world::World;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::{CameraTarget, Transform};
use crate::EngineError;

/// World position of the single camera target.
///
/// Returns `Ok(None)` when no live entity has both [`CameraTarget`] and
/// [`Transform`].
///
/// # Errors
///
/// [`EngineError::MultipleCameraTargets`] if more than one does.
pub fn camera_focus(world: &World) -> Result<Option<Vec2>, EngineError> {
    let mut targets = world.query::<(CameraTarget, Transform)>();
    let Some((_, (_, first))) = targets.next() else {
        return Ok(None);
    };
    let extra = targets.count();
    if extra > 0 {
        return Err(EngineError::MultipleCameraTargets { count: extra + 1 });
    }
    Ok(Some(first.position))
}

/// A 2D orthographic camera.
///
/// The default view spans the movement bounds (16 x 9 world units) centered
/// on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera2D {
    /// Width of the visible area in world units.
    pub width: f32,
    /// Height of the visible area in world units.
    pub height: f32,
    pub center: Vec2,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 9.0,
            center: Vec2::ZERO,
        }
    }
}

impl Camera2D {
    /// Recenter on the camera target, if there is one. Returns whether the
    /// camera moved.
    pub fn follow(&mut self, world: &World) -> Result<bool, EngineError> {
        match camera_focus(world)? {
            Some(focus) => {
                self.center = focus;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Column-major 4x4 projection mapping the visible area to `[-1, 1]`.
    pub fn orthographic_matrix(&self) -> [f32; 16] {
        let sx = 2.0 / self.width;
        let sy = 2.0 / self.height;
        let tx = -self.center.x * sx;
        let ty = -self.center.y * sy;
        [
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            tx, ty, 0.0, 1.0,
        ]
    }
}
