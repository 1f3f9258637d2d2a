//! Simulation component types.
//!
//! Plain data records. Behaviour comes from which of these an entity owns,
//! not from any relationship between the types themselves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Linear RGBA color, each channel nominally in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Channel-wise linear interpolation; `t` is not clamped.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// World-space placement of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

// ---------------------------------------------------------------------------
// PhysicsBody
// ---------------------------------------------------------------------------

/// Point-mass body integrated by the movement system.
///
/// `acceleration` accumulates forces applied during a frame and is reset to
/// zero after integration, so forces act as per-frame impulses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Must be positive.
    pub mass: f32,
    /// Linear drag coefficient per second.
    pub drag: f32,
    pub use_gravity: bool,
    /// Kinematic bodies are moved by game logic only: player input and
    /// integration skip them, and only the transform pass reads their velocity.
    pub is_kinematic: bool,
}

impl PhysicsBody {
    /// Accumulate `force / mass` into this frame's acceleration.
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force / self.mass;
    }
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass: 1.0,
            drag: 0.0,
            use_gravity: false,
            is_kinematic: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerControl
// ---------------------------------------------------------------------------

/// Marks an entity as steered by directional input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerControl {
    /// Magnitude of the input force.
    pub speed: f32,
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self { speed: 5.0 }
    }
}

// ---------------------------------------------------------------------------
// Sprites
// ---------------------------------------------------------------------------

/// A single static sprite frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Sprite-sheet frame name, resolved by the render collaborator.
    pub frame: String,
    pub size: Vec2,
    pub color: Color,
    /// Draw order; lower layers are drawn first.
    pub layer: i32,
}

impl Sprite {
    pub fn new(frame: impl Into<String>, size: Vec2) -> Self {
        Self {
            frame: frame.into(),
            size,
            color: Color::WHITE,
            layer: 0,
        }
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// A flip-book animation over named sprite-sheet frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatedSprite {
    pub frames: Vec<String>,
    /// Seconds each frame is shown.
    pub frame_duration: f32,
    pub looping: bool,
    pub current_frame: usize,
    /// Time spent on the current frame.
    pub timer: f32,
    /// Set once a non-looping animation reaches its last frame.
    pub finished: bool,
    pub size: Vec2,
    pub color: Color,
    pub layer: i32,
}

impl AnimatedSprite {
    pub fn new(frames: Vec<String>, frame_duration: f32, size: Vec2) -> Self {
        Self {
            frames,
            frame_duration,
            looping: true,
            current_frame: 0,
            timer: 0.0,
            finished: false,
            size,
            color: Color::WHITE,
            layer: 0,
        }
    }

    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Name of the frame currently shown, or `None` for an empty animation.
    pub fn current_frame_name(&self) -> Option<&str> {
        self.frames.get(self.current_frame).map(String::as_str)
    }

    /// Advance the animation clock by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if self.finished || self.frames.is_empty() || self.frame_duration <= 0.0 {
            return;
        }
        self.timer += dt;
        while self.timer >= self.frame_duration {
            self.timer -= self.frame_duration;
            if self.current_frame + 1 < self.frames.len() {
                self.current_frame += 1;
            } else if self.looping {
                self.current_frame = 0;
            } else {
                self.finished = true;
                self.timer = 0.0;
                break;
            }
        }
    }

    /// Rewind to the first frame.
    pub fn restart(&mut self) {
        self.current_frame = 0;
        self.timer = 0.0;
        self.finished = false;
    }
}

/// Marks the entity the camera should follow. At most one may exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraTarget;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
