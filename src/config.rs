//! Process-wide input switches.
//!
//! These flags belong to the host application. The controller core only
//! reads them, and always through an explicitly passed [`Settings`] value,
//! so independent managers (and tests) can run side by side.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::JoyError;

pub const APP_DIR: &str = "joycore";
pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Master switch for controller input.
    pub use_joystick: bool,
    /// Allows force feedback at all.
    pub joy_feedback: bool,
    /// Multiplier applied to every rumble magnitude before it reaches a motor.
    pub joy_feedback_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_joystick: true,
            joy_feedback: true,
            joy_feedback_scale: 1.0,
        }
    }
}

impl Settings {
    pub fn feedback(&self) -> FeedbackSettings {
        FeedbackSettings {
            enabled: self.joy_feedback,
            scale: self.joy_feedback_scale,
        }
    }

    /// `<config dir>/joycore/settings.toml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    pub fn load(path: &Path) -> Result<Self, JoyError> {
        let content = fs::read_to_string(path).map_err(|e| JoyError::io(path, e))?;
        let settings: Settings = toml::from_str(&content).map_err(|e| JoyError::parse(path, e))?;
        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), JoyError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| JoyError::io(parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| JoyError::io(path, e))
    }

    /// Loads the settings file, writing the defaults first if it is missing.
    /// A file that fails to parse is reported and replaced by defaults in
    /// memory only, so the user's file is never clobbered.
    pub fn ensure_default_config(path: &Path) -> Result<Self, JoyError> {
        if !path.exists() {
            info!("No settings at {}, writing defaults", path.display());
            let settings = Settings::default();
            settings.save(path)?;
            return Ok(settings);
        }

        match Settings::load(path) {
            Ok(settings) => Ok(settings),
            Err(JoyError::Parse { path, source }) => {
                warn!(
                    "Ignoring unreadable settings {}: {}",
                    path.display(),
                    source
                );
                Ok(Settings::default())
            }
            Err(e) => Err(e),
        }
    }
}

/// The rumble-related part of [`Settings`], copied into each provider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedbackSettings {
    pub enabled: bool,
    pub scale: f32,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Settings::default().feedback()
    }
}

impl FeedbackSettings {
    /// Motor magnitudes after the global switch and scale, or `None` when
    /// feedback is off.
    pub fn scaled(&self, left: f32, right: f32) -> Option<(f32, f32)> {
        if !self.enabled {
            return None;
        }
        let scale = if self.scale.is_finite() {
            self.scale.max(0.0)
        } else {
            0.0
        };
        Some((
            (left * scale).clamp(0.0, 1.0),
            (right * scale).clamp(0.0, 1.0),
        ))
    }
}
