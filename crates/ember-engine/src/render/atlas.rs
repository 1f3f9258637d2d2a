//! Sprite-sheet frame lookup.
//!
//! Resolving a frame name is fallible: an unknown name yields `None`, and the
//! caller decides what to draw instead.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Normalized texture coordinates of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.u0, self.v0, self.u1, self.v1]
    }
}

/// Resolves sprite-sheet frame names.
pub trait FrameLookup {
    fn lookup(&self, name: &str) -> Option<UvRect>;
}

/// In-memory frame table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteAtlas {
    frames: HashMap<String, UvRect>,
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slice a sheet into `columns x rows` equal cells named
    /// `{prefix}_{index}`, row-major from the top-left.
    pub fn uniform_grid(prefix: &str, columns: u32, rows: u32) -> Self {
        let mut atlas = Self::new();
        if columns == 0 || rows == 0 {
            return atlas;
        }
        let w = 1.0 / columns as f32;
        let h = 1.0 / rows as f32;
        for row in 0..rows {
            for col in 0..columns {
                let index = row * columns + col;
                let (u0, v0) = (col as f32 * w, row as f32 * h);
                atlas.insert(format!("{prefix}_{index}"), UvRect::new(u0, v0, u0 + w, v0 + h));
            }
        }
        atlas
    }

    /// Add or replace a frame. Returns the previous rectangle, if any.
    pub fn insert(&mut self, name: impl Into<String>, uv: UvRect) -> Option<UvRect> {
        self.frames.insert(name.into(), uv)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameLookup for SpriteAtlas {
    fn lookup(&self, name: &str) -> Option<UvRect> {
        self.frames.get(name).copied()
    }
}
