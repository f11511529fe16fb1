//! Frame-level driver on top of a [`ControllerProvider`].

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::JoyError;
use crate::persistence::{load_controller_config, save_controller_config, ProfileStore};

use super::axis::NUM_JOY_AXIS;
use super::buttons::KeyEvent;
use super::config::ControllerConfig;
use super::provider::{ControllerProvider, DeviceListChange};
use super::rumble::RumbleOutcome;

/// Owns a provider together with the settings and the profile store, and
/// keeps the three consistent across hotplug and settings changes.
pub struct InputManager<P: ControllerProvider> {
    provider: P,
    settings: Settings,
    store: Box<dyn ProfileStore>,
    focused: bool,
}

impl<P: ControllerProvider> InputManager<P> {
    /// Pushes the feedback settings down and runs the first device refresh,
    /// so already connected controllers come up with their saved profiles.
    pub fn new(provider: P, settings: Settings, store: Box<dyn ProfileStore>) -> Self {
        let mut manager = Self {
            provider,
            settings,
            store,
            focused: true,
        };
        manager
            .provider
            .apply_feedback(manager.settings.feedback());
        manager.refresh_devices();
        manager
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings and forwards the feedback part to the provider.
    pub fn set_settings(&mut self, settings: Settings) {
        debug!("Settings changed: {:?}", settings);
        self.settings = settings;
        self.provider.apply_feedback(self.settings.feedback());
    }

    /// Window focus as reported by the host. Unfocused, only controllers
    /// enabled in the background keep reporting.
    pub fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            debug!("Focus changed to {}", focused);
        }
        self.focused = focused;
    }

    pub fn controller(&mut self, identifier: &str) -> Option<&mut dyn ControllerConfig> {
        self.provider.controller(identifier)
    }

    /// Re-enumerates devices. Profiles of the current devices are captured
    /// first; newly added devices get their saved profile loaded.
    pub fn refresh_devices(&mut self) -> DeviceListChange {
        self.capture_all();

        let change = self.provider.update_device_list();
        if !change.is_empty() {
            info!(
                "{} devices: {} added, {} removed",
                self.provider.name(),
                change.added.len(),
                change.removed.len()
            );
        }
        self.provider.apply_feedback(self.settings.feedback());

        for identifier in &change.added {
            match self.provider.controller(identifier) {
                Some(controller) => {
                    load_controller_config(&*self.store, controller);
                }
                None => warn!("Added controller {} is not listed by the provider", identifier),
            }
        }
        change
    }

    /// Advances rumble, polls input and handles pending hotplug.
    /// While controller input is switched off only releases are returned, so
    /// keys pressed before the switch do not stay held.
    pub fn tick(&mut self) -> Vec<KeyEvent> {
        for controller in self.provider.controllers() {
            controller.update_rumble();
        }

        let events = self.provider.poll(self.focused);

        if self.provider.device_list_dirty() {
            self.refresh_devices();
        }

        if !self.settings.use_joystick {
            let total = events.len();
            let releases: Vec<KeyEvent> =
                events.into_iter().filter(|event| !event.is_pressed()).collect();
            if total > releases.len() {
                debug!(
                    "Dropping {} key presses, joystick input is off",
                    total - releases.len()
                );
            }
            return releases;
        }
        events
    }

    /// Movement summed over every controller.
    pub fn axes(&mut self) -> [f32; NUM_JOY_AXIS] {
        let mut axes = [0.0; NUM_JOY_AXIS];
        if self.settings.use_joystick {
            self.provider.axes(&mut axes);
        }
        axes
    }

    /// Adds `factor` to both channels of every enabled controller. The
    /// provider applies `joy_feedback_scale` when forwarding to the motors.
    pub fn set_joystick_rumble(&mut self, factor: f32) -> Vec<RumbleOutcome> {
        if !self.settings.joy_feedback {
            debug!("Ignoring rumble {:.2}, feedback is off", factor);
            return Vec::new();
        }
        self.provider
            .controllers()
            .into_iter()
            .filter(|controller| controller.enabled())
            .map(|controller| controller.add_rumble(factor, factor))
            .collect()
    }

    /// Stores one controller's profile and flushes the store.
    pub fn save_controller(&mut self, identifier: &str) -> Result<bool, JoyError> {
        let Some(controller) = self.provider.controller(identifier) else {
            return Ok(false);
        };
        save_controller_config(&mut *self.store, &*controller);
        self.store.flush()?;
        Ok(true)
    }

    pub fn save_all(&mut self) -> Result<(), JoyError> {
        self.capture_all();
        self.store.flush()
    }

    fn capture_all(&mut self) {
        for controller in self.provider.controllers() {
            save_controller_config(&mut *self.store, &*controller);
        }
    }
}
