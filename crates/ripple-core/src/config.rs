//! Configuration for mirror and water surfaces.
//!
//! All fields are tunable constants; nothing here is recomputed at runtime.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RippleError};

/// Largest render target edge accepted without a GPU limits query.
pub const MAX_TARGET_DIMENSION: u32 = 8192;

/// Configuration shared by every reflective surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Offscreen reflection target width in pixels.
    pub width: u32,
    /// Offscreen reflection target height in pixels.
    pub height: u32,
    /// Oblique clip plane bias. Zero clips exactly on the mirror plane;
    /// small values push the clip plane to avoid z-fighting at the surface.
    pub clip_bias: f32,
    /// Surface opacity written as the fragment alpha.
    pub alpha: f32,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            clip_bias: 0.0,
            alpha: 1.0,
        }
    }
}

impl MirrorConfig {
    /// Validates the target resolution.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_TARGET_DIMENSION
            || self.height > MAX_TARGET_DIMENSION
        {
            return Err(RippleError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Extra tunables for the animated water variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaterConfig {
    /// Scale applied to the normal-map distortion of the reflection sample.
    pub distortion_scale: f32,
    /// Spatial frequency multiplier for the noise octaves.
    pub size: f32,
    /// Direction toward the sun, in world space.
    pub sun_direction: Vec3,
    /// Sun light color.
    pub sun_color: Vec3,
    /// Base water scatter color.
    pub water_color: Vec3,
    /// Time added per rendered frame.
    pub time_step: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            distortion_scale: 3.7,
            size: 1.0,
            sun_direction: Vec3::new(0.70707, 0.70707, 0.0),
            sun_color: Vec3::ONE,
            water_color: Vec3::new(0.0, 30.0 / 255.0, 15.0 / 255.0),
            time_step: crate::clock::DEFAULT_TIME_STEP,
        }
    }
}

impl WaterConfig {
    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
