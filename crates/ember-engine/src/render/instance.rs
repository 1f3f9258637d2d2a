//! GPU-ready per-instance sprite data.

use glam::Vec2;

use super::atlas::UvRect;
use crate::components::Color;

/// One textured quad, laid out for direct upload as an instance buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
pub struct SpriteInstance {
    /// Quad center in world units.
    pub position: [f32; 2],
    /// Full extents in world units.
    pub size: [f32; 2],
    pub color: [f32; 4],
    /// `[u0, v0, u1, v1]`.
    pub uv: [f32; 4],
    pub rotation: f32,
    _pad: [f32; 3],
}

impl SpriteInstance {
    pub fn new(position: Vec2, size: Vec2, rotation: f32, color: Color, uv: UvRect) -> Self {
        Self {
            position: position.to_array(),
            size: size.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
            rotation,
            _pad: [0.0; 3],
        }
    }
}

/// View an instance slice as raw bytes for a vertex buffer upload.
pub fn instances_as_bytes(instances: &[SpriteInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
