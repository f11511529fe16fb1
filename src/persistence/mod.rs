//! Saving and restoring controller settings.
//!
//! Only values that differ from a device's defaults are stored, keyed by
//! [`ControllerConfig::identifier`]. A controller that was never touched
//! leaves no trace, and a change of defaults in a later release reaches every
//! user who did not override that value.
//!
//! Loading is forgiving: out-of-range values from a damaged profile are
//! clamped and non-finite ones skipped, so bad data never stops startup.

pub mod toml_store;

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::controller::axis::JoyAxis;
use crate::controller::config::ControllerConfig;
use crate::error::JoyError;

pub use toml_store::TomlProfileStore;

/// Largest magnitude accepted for a loaded sensitivity or axis scale.
pub const MAX_LOADED_SCALE: f32 = 100.0;

/// Non-default settings of one axis.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct AxisProfile {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_zone: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    /// Raw [`JoyAxis`] encoding, kept as an integer so damaged values can
    /// still be clamped on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<i32>,
}

impl AxisProfile {
    fn is_empty(&self) -> bool {
        self.dead_zone.is_none() && self.scale.is_none() && self.map.is_none()
    }
}

/// Sparse snapshot of a controller's settings.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ControllerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_in_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<AxisProfile>,
}

impl ControllerProfile {
    /// Records everything about `config` that is not at its default.
    pub fn capture(config: &dyn ControllerConfig) -> Self {
        let mut profile = ControllerProfile::default();

        if !config.is_sensitivity_default() {
            profile.sensitivity = Some(config.sensitivity());
        }
        if !config.enabled() {
            profile.enabled = Some(false);
        }
        if config.allows_enabled_in_background() && config.enabled_in_background() {
            profile.enabled_in_background = Some(true);
        }

        for index in 0..config.num_axes() {
            let axis = AxisProfile {
                index,
                dead_zone: (!config.is_axis_dead_zone_default(index))
                    .then(|| config.axis_dead_zone(index)),
                scale: (!config.is_axis_scale_default(index)).then(|| config.axis_scale(index)),
                map: (!config.is_axis_map_default(index)).then(|| config.axis_map(index).to_raw()),
            };
            if !axis.is_empty() {
                profile.axes.push(axis);
            }
        }

        profile
    }

    /// True when nothing but the timestamp would be written.
    pub fn is_empty(&self) -> bool {
        self.sensitivity.is_none()
            && self.enabled.is_none()
            && self.enabled_in_background.is_none()
            && self.axes.is_empty()
    }

    /// Writes the stored values into `config`, clamping as it goes.
    pub fn apply(&self, config: &mut dyn ControllerConfig) {
        let identifier = config.identifier();

        if let Some(sensitivity) = finite(self.sensitivity, &identifier, "sensitivity") {
            config.set_sensitivity(sensitivity.clamp(-MAX_LOADED_SCALE, MAX_LOADED_SCALE));
        }
        if let Some(enabled) = self.enabled {
            config.set_enabled(enabled);
        }
        if let Some(background) = self.enabled_in_background {
            if config.allows_enabled_in_background() {
                config.set_enabled_in_background(background);
            } else {
                debug!(
                    "{} cannot run in the background, ignoring saved flag",
                    identifier
                );
            }
        }

        let num_axes = config.num_axes();
        for axis in &self.axes {
            if axis.index >= num_axes {
                warn!(
                    "Profile for {} names axis {} but the device has {}",
                    identifier, axis.index, num_axes
                );
                continue;
            }
            if let Some(zone) = finite(axis.dead_zone, &identifier, "dead zone") {
                config.set_axis_dead_zone(axis.index, zone.clamp(0.0, 1.0));
            }
            if let Some(scale) = finite(axis.scale, &identifier, "axis scale") {
                config.set_axis_scale(axis.index, scale.clamp(-MAX_LOADED_SCALE, MAX_LOADED_SCALE));
            }
            if let Some(map) = axis.map {
                config.set_axis_map(axis.index, JoyAxis::from_raw(map));
            }
        }
    }
}

fn finite(value: Option<f32>, identifier: &str, what: &str) -> Option<f32> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            warn!("Skipping non-finite {} {} for {}", what, v, identifier);
            None
        }
        None => None,
    }
}

/// Keyed storage for controller profiles.
pub trait ProfileStore {
    fn get(&self, identifier: &str) -> Option<ControllerProfile>;
    fn put(&mut self, identifier: &str, profile: ControllerProfile);
    fn remove(&mut self, identifier: &str);

    /// Persists pending changes, for stores backed by a file.
    fn flush(&mut self) -> Result<(), JoyError> {
        Ok(())
    }
}

/// Store that lives and dies with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryProfileStore {
    profiles: BTreeMap<String, ControllerProfile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, identifier: &str) -> Option<ControllerProfile> {
        self.profiles.get(identifier).cloned()
    }

    fn put(&mut self, identifier: &str, profile: ControllerProfile) {
        self.profiles.insert(identifier.to_string(), profile);
    }

    fn remove(&mut self, identifier: &str) {
        self.profiles.remove(identifier);
    }
}

/// Resets `config` to its defaults, then applies the stored profile.
/// Returns false when the device has never been saved.
pub fn load_controller_config(store: &dyn ProfileStore, config: &mut dyn ControllerConfig) -> bool {
    config.set_default_config();

    let identifier = config.identifier();
    match store.get(&identifier) {
        Some(profile) => {
            info!("Loading saved settings for {} ({})", config.name(), identifier);
            profile.apply(config);
            true
        }
        None => {
            debug!("No saved settings for {}", identifier);
            false
        }
    }
}

/// Stores the non-default settings of `config`; an untouched controller
/// removes its entry instead.
pub fn save_controller_config(store: &mut dyn ProfileStore, config: &dyn ControllerConfig) {
    let identifier = config.identifier();
    let mut profile = ControllerProfile::capture(config);

    if profile.is_empty() {
        debug!("{} is at its defaults, dropping saved entry", identifier);
        store.remove(&identifier);
        return;
    }

    profile.saved_at = Some(Local::now());
    debug!("Saving settings for {}: {:?}", identifier, profile);
    store.put(&identifier, profile);
}
