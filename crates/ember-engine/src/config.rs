//! Engine configuration.
//!
//! Every tunable constant of the simulation lives in a plain serde struct
//! with sensible defaults, so a whole [`EngineConfig`] can be loaded from a
//! JSON document and any omitted field falls back to its default.
//!
//! ```
//! use ember_engine::config::EngineConfig;
//!
//! let json = r#"{ "physics": { "horizontal_bound": 10.0 } }"#;
//! let config = EngineConfig::from_json_str(json).unwrap();
//! assert_eq!(config.physics.horizontal_bound, 10.0);
//! assert_eq!(config.physics.vertical_bound, 4.5);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON for this schema.
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot run with.
    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// PhysicsConfig
// ---------------------------------------------------------------------------

/// Constants used by the movement system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration applied to gravity-enabled bodies (y is up).
    pub gravity: Vec2,
    /// Positions with `|x|` beyond this are clamped and reflected.
    pub horizontal_bound: f32,
    /// Positions with `|y|` beyond this are clamped and reflected.
    pub vertical_bound: f32,
    /// Velocity multiplier applied on reflection (after negation).
    pub bounce_damping: f32,
    /// Scale of the drag applied during integration, relative to the
    /// input-pass drag.
    pub integration_drag_scale: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            horizontal_bound: 8.0,
            vertical_bound: 4.5,
            bounce_damping: 0.8,
            integration_drag_scale: 0.5,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.horizontal_bound > 0.0 && self.horizontal_bound.is_finite()) {
            return Err(invalid("physics.horizontal_bound", "must be positive and finite"));
        }
        if !(self.vertical_bound > 0.0 && self.vertical_bound.is_finite()) {
            return Err(invalid("physics.vertical_bound", "must be positive and finite"));
        }
        if !(0.0..=1.0).contains(&self.bounce_damping) {
            return Err(invalid("physics.bounce_damping", "must be within 0..=1"));
        }
        if !self.gravity.is_finite() {
            return Err(invalid("physics.gravity", "must be finite"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FrameConfig
// ---------------------------------------------------------------------------

/// Frame-loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Delta time used by [`FrameLoop::step`](crate::frame::FrameLoop::step)
    /// for headless stepping. Must be positive and finite.
    pub fixed_dt: f32,
    /// Run the orphan sweep every this many frames. `0` disables the
    /// periodic sweep; it can still be invoked directly on the world.
    pub orphan_sweep_interval: u64,
}

impl Default for FrameConfig {
    /// 60 Hz, orphan sweep once a second.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            orphan_sweep_interval: 60,
        }
    }
}

impl FrameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fixed_dt > 0.0 && self.fixed_dt.is_finite()) {
            return Err(invalid(
                "frame.fixed_dt",
                format!("must be positive and finite, got {}", self.fixed_dt),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub frame: FrameConfig,
    /// Seed for particle emitters created by the demo scene.
    pub rng_seed: u64,
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        self.frame.validate()
    }
}
