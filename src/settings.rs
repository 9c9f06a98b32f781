//! Engine Settings
//!
//! Runtime configuration for the engine core, grouped by subsystem.
//!
//! Every group implements [`Default`] with the values the runtime was tuned
//! with, and every field is optional when deserializing, so a settings file
//! only needs to mention what it overrides.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tundra::settings::EngineSettings;
//!
//! // Defaults
//! let settings = EngineSettings::default();
//!
//! // Partial override from JSON
//! let settings = EngineSettings::from_json_str(r#"{ "shadow": { "map_size": 4096 } }"#)?;
//! assert_eq!(settings.shadow.map_size, 4096);
//! assert_eq!(settings.shadow.split_scheme_weight, 0.82);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::scene::event::MissingHandlerPolicy;
use crate::scene::transform::CoordinateSystem;

// ---------------------------------------------------------------------------
// EngineSettings
// ---------------------------------------------------------------------------

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Transform composition parameters.
    pub transform: TransformSettings,
    /// Cascaded shadow map parameters.
    pub shadow: ShadowSettings,
    /// Event bus behavior.
    pub events: EventSettings,
    /// Scene manager behavior.
    pub scene: SceneSettings,
}

impl EngineSettings {
    /// Parses settings from JSON text. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading engine settings from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Serializes the settings as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// How actor transforms are composed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Unit conversion applied to every actor scale (assets are authored in centimeters).
    pub to_meters_scale: f32,
    /// Axis convention of the authored assets.
    pub coordinate_system: CoordinateSystem,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            to_meters_scale: 0.01,
            coordinate_system: CoordinateSystem::RhYUp,
        }
    }
}

/// Cascaded shadow map configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Width and height of each cascade layer in texels.
    pub map_size: u32,
    /// Blend between uniform (`0.0`) and logarithmic (`1.0`) split schemes.
    pub split_scheme_weight: f32,
    /// Shadowed range cutoff in view space; `0.0` uses the camera far plane.
    pub critical_depth: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 2048,
            split_scheme_weight: 0.82,
            critical_depth: 0.0,
        }
    }
}

/// Event bus configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// What dispatching to a key without handlers does.
    pub missing_handler: MissingHandlerPolicy,
}

/// Scene manager configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Worker threads of the background preload runtime.
    pub preload_worker_threads: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            preload_worker_threads: 1,
        }
    }
}
