//! The capability interface every controller implementation satisfies.

use tracing::warn;

use super::axis::JoyAxis;
use super::rumble::{RumbleController, RumbleOutcome};

/// Per-device configuration and feedback surface.
///
/// The engine, the configuration menus and the persistence layer only ever
/// see controllers through this trait. Platform providers implement it for
/// their device type, embedding an [`super::axis::AxisTable`] and a
/// [`RumbleController`] rather than inheriting behaviour.
///
/// Axis indices must lie in `0..num_axes()`. Passing anything else is a
/// caller error.
pub trait ControllerConfig {
    fn name(&self) -> String;

    /// Stable key for saved settings. Must identify the physical device
    /// across sessions, not the slot it happens to occupy.
    fn identifier(&self) -> String;

    /// Global multiplier applied after the per-axis scale.
    fn sensitivity(&self) -> f32;
    fn set_sensitivity(&mut self, scale: f32);

    fn num_axes(&self) -> usize;
    fn axis_dead_zone(&self, axis: usize) -> f32;
    fn axis_map(&self, axis: usize) -> JoyAxis;
    fn axis_name(&self, axis: usize) -> String;
    fn axis_scale(&self, axis: usize) -> f32;

    /// `zone` is clamped to `[0, 1]`.
    fn set_axis_dead_zone(&mut self, axis: usize, zone: f32);
    fn set_axis_map(&mut self, axis: usize, map: JoyAxis);
    fn set_axis_scale(&mut self, axis: usize, scale: f32);

    /// Whether the device contributes input at all.
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);

    /// Some devices go silent while the application is unfocused. When this
    /// is false the two background accessors below are meaningless.
    fn allows_enabled_in_background(&self) -> bool {
        false
    }

    fn enabled_in_background(&self) -> bool {
        false
    }

    fn set_enabled_in_background(&mut self, _enabled: bool) {}

    // Used by the saver to skip properties that are still at their defaults.
    fn is_sensitivity_default(&self) -> bool;
    fn is_axis_dead_zone_default(&self, axis: usize) -> bool;
    fn is_axis_map_default(&self, axis: usize) -> bool;
    fn is_axis_scale_default(&self, axis: usize) -> bool;

    /// Resets every global and per-axis setting.
    fn set_default_config(&mut self);

    fn rumble(&self) -> &RumbleController;
    fn rumble_mut(&mut self) -> &mut RumbleController;

    /// Drives the motors. Providers with rumble support override this; the
    /// fallback only reports that rumble is not available.
    fn set_rumble_internal(&mut self, left: f32, right: f32) -> RumbleOutcome {
        rumble_not_implemented(&self.name(), left, right)
    }

    /// Replaces both channels and forwards them.
    fn set_rumble(&mut self, left: f32, right: f32) -> RumbleOutcome {
        let (left, right) = self.rumble_mut().set(left, right);
        self.set_rumble_internal(left, right)
    }

    /// Adds to the decayed channels and forwards the sum.
    fn add_rumble(&mut self, left: f32, right: f32) -> RumbleOutcome {
        let (left, right) = self.rumble_mut().add(left, right);
        self.set_rumble_internal(left, right)
    }

    /// Once per tick. Only advances the tracked magnitude.
    fn update_rumble(&mut self) {
        self.rumble_mut().update();
    }
}

/// Soft failure shared by every device without motors.
pub fn rumble_not_implemented(name: &str, left: f32, right: f32) -> RumbleOutcome {
    warn!(
        "Rumble not implemented for {} (requested {:.2}/{:.2})",
        name, left, right
    );
    RumbleOutcome::Unsupported
}
