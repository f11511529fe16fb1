//! Contract for platform-specific controller providers.

use crate::config::FeedbackSettings;

use super::axis::NUM_JOY_AXIS;
use super::buttons::KeyEvent;
use super::config::ControllerConfig;

/// Identifiers that appeared or disappeared during a device refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceListChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl DeviceListChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// A source of controllers: owns the devices, polls them and reports raw
/// movement.
pub trait ControllerProvider {
    fn name(&self) -> &str;

    /// Every controller currently known to the provider.
    fn controllers(&mut self) -> Vec<&mut dyn ControllerConfig>;

    fn controller(&mut self, identifier: &str) -> Option<&mut dyn ControllerConfig> {
        self.controllers()
            .into_iter()
            .find(|controller| controller.identifier() == identifier)
    }

    /// Re-enumerates devices and reports what changed.
    fn update_device_list(&mut self) -> DeviceListChange;

    /// True once the provider has noticed a connect or disconnect that
    /// [`ControllerProvider::update_device_list`] has not handled yet.
    fn device_list_dirty(&self) -> bool {
        false
    }

    /// Samples every device and returns the key transitions since the last
    /// poll. Devices that are disabled, or unfocused without background
    /// permission, release whatever they still held and then stay quiet.
    fn poll(&mut self, focused: bool) -> Vec<KeyEvent>;

    /// Adds each device's conditioned movement into `axes`.
    fn axes(&mut self, axes: &mut [f32; NUM_JOY_AXIS]);

    /// Pushes the global feedback switches down to the devices.
    fn apply_feedback(&mut self, _feedback: FeedbackSettings) {}
}

/// Whether `controller` should report input this frame.
pub fn contributes_input(controller: &dyn ControllerConfig, focused: bool) -> bool {
    controller.enabled()
        && (focused
            || (controller.allows_enabled_in_background() && controller.enabled_in_background()))
}
