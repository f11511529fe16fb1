//! Scripted controllers for unit tests.

use std::rc::Rc;

use crate::config::FeedbackSettings;
use crate::keys::JOY_BUTTON_BASE;

use super::axis::{AxisDefaults, AxisTable, JoyAxis, DEFAULT_SENSITIVITY, NUM_JOY_AXIS};
use super::buttons::{ButtonTracker, KeyEvent, KeyMapping};
use super::config::{rumble_not_implemented, ControllerConfig};
use super::provider::{contributes_input, ControllerProvider, DeviceListChange};
use super::rumble::{ManualClock, RumbleController, RumbleOutcome};

pub(crate) const VIRTUAL_BUTTONS: usize = 8;

pub(crate) struct VirtualController {
    name: String,
    identifier: String,
    axes: AxisTable,
    sensitivity: f32,
    enabled: bool,
    enabled_in_background: bool,
    background_capable: bool,
    rumble: RumbleController,
    motors: bool,
    feedback: FeedbackSettings,
    forwarded: Vec<(f32, f32)>,
    raw_axes: Vec<f32>,
    raw_buttons: u32,
    tracker: ButtonTracker,
}

impl VirtualController {
    pub(crate) fn new(name: &str) -> (Rc<ManualClock>, Self) {
        let clock = Rc::new(ManualClock::new(0.0));
        let pad = Self::with_clock(name, name, clock.clone(), true);
        (clock, pad)
    }

    pub(crate) fn without_motors(name: &str) -> (Rc<ManualClock>, Self) {
        let clock = Rc::new(ManualClock::new(0.0));
        let pad = Self::with_clock(name, name, clock.clone(), false);
        (clock, pad)
    }

    pub(crate) fn with_clock(
        name: &str,
        identifier: &str,
        clock: Rc<ManualClock>,
        motors: bool,
    ) -> Self {
        let axes = AxisTable::new(vec![
            AxisDefaults::new("X Axis", 0.2, JoyAxis::Side),
            AxisDefaults::new("Y Axis", 0.2, JoyAxis::Forward),
            AxisDefaults::new("Throttle", 0.0, JoyAxis::None),
        ]);
        let raw_axes = vec![0.0; axes.len()];
        Self {
            name: name.to_string(),
            identifier: identifier.to_string(),
            axes,
            sensitivity: DEFAULT_SENSITIVITY,
            enabled: true,
            enabled_in_background: false,
            background_capable: true,
            rumble: RumbleController::new(clock),
            motors,
            feedback: FeedbackSettings::default(),
            forwarded: Vec::new(),
            raw_axes,
            raw_buttons: 0,
            tracker: ButtonTracker::new(),
        }
    }

    pub(crate) fn without_background(mut self) -> Self {
        self.background_capable = false;
        self
    }

    pub(crate) fn last_forwarded(&self) -> Option<(f32, f32)> {
        self.forwarded.last().copied()
    }

    pub(crate) fn forwarded(&self) -> &[(f32, f32)] {
        &self.forwarded
    }

    pub(crate) fn set_buttons(&mut self, mask: u32) {
        self.raw_buttons = mask;
    }

    pub(crate) fn set_raw_axis(&mut self, axis: usize, value: f32) {
        self.raw_axes[axis] = value;
    }

    fn poll(&mut self, focused: bool) -> Vec<KeyEvent> {
        let mapping = KeyMapping::Base(JOY_BUTTON_BASE);
        if contributes_input(&*self, focused) {
            self.tracker.update(self.raw_buttons, VIRTUAL_BUTTONS, mapping)
        } else {
            self.tracker.release_all(VIRTUAL_BUTTONS, mapping)
        }
    }
}

impl ControllerConfig for VirtualController {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    fn set_sensitivity(&mut self, scale: f32) {
        self.sensitivity = scale;
    }

    fn num_axes(&self) -> usize {
        self.axes.len()
    }

    fn axis_dead_zone(&self, axis: usize) -> f32 {
        self.axes.dead_zone(axis)
    }

    fn axis_map(&self, axis: usize) -> JoyAxis {
        self.axes.map(axis)
    }

    fn axis_name(&self, axis: usize) -> String {
        self.axes.name(axis).to_string()
    }

    fn axis_scale(&self, axis: usize) -> f32 {
        self.axes.scale(axis)
    }

    fn set_axis_dead_zone(&mut self, axis: usize, zone: f32) {
        self.axes.set_dead_zone(axis, zone);
    }

    fn set_axis_map(&mut self, axis: usize, map: JoyAxis) {
        self.axes.set_map(axis, map);
    }

    fn set_axis_scale(&mut self, axis: usize, scale: f32) {
        self.axes.set_scale(axis, scale);
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn allows_enabled_in_background(&self) -> bool {
        self.background_capable
    }

    fn enabled_in_background(&self) -> bool {
        self.background_capable && self.enabled_in_background
    }

    fn set_enabled_in_background(&mut self, enabled: bool) {
        self.enabled_in_background = enabled;
    }

    fn is_sensitivity_default(&self) -> bool {
        self.sensitivity == DEFAULT_SENSITIVITY
    }

    fn is_axis_dead_zone_default(&self, axis: usize) -> bool {
        self.axes.is_dead_zone_default(axis)
    }

    fn is_axis_map_default(&self, axis: usize) -> bool {
        self.axes.is_map_default(axis)
    }

    fn is_axis_scale_default(&self, axis: usize) -> bool {
        self.axes.is_scale_default(axis)
    }

    fn set_default_config(&mut self) {
        self.sensitivity = DEFAULT_SENSITIVITY;
        self.axes.reset();
    }

    fn rumble(&self) -> &RumbleController {
        &self.rumble
    }

    fn rumble_mut(&mut self) -> &mut RumbleController {
        &mut self.rumble
    }

    fn set_rumble_internal(&mut self, left: f32, right: f32) -> RumbleOutcome {
        if !self.motors {
            return rumble_not_implemented(&self.name, left, right);
        }
        match self.feedback.scaled(left, right) {
            Some(scaled) => {
                self.forwarded.push(scaled);
                RumbleOutcome::Applied
            }
            None => RumbleOutcome::Suppressed,
        }
    }
}

/// Provider whose device list is edited by the test.
pub(crate) struct VirtualProvider {
    pads: Vec<VirtualController>,
    pending: Vec<VirtualController>,
    unplugged: Vec<String>,
}

impl VirtualProvider {
    pub(crate) fn new() -> Self {
        Self {
            pads: Vec::new(),
            pending: Vec::new(),
            unplugged: Vec::new(),
        }
    }

    pub(crate) fn plug(&mut self, pad: VirtualController) {
        self.pending.push(pad);
    }

    pub(crate) fn unplug(&mut self, identifier: &str) {
        self.unplugged.push(identifier.to_string());
    }

    pub(crate) fn pad(&self, identifier: &str) -> Option<&VirtualController> {
        self.pads.iter().find(|pad| pad.identifier == identifier)
    }

    pub(crate) fn pad_mut(&mut self, identifier: &str) -> Option<&mut VirtualController> {
        self.pads.iter_mut().find(|pad| pad.identifier == identifier)
    }
}

impl ControllerProvider for VirtualProvider {
    fn name(&self) -> &str {
        "virtual"
    }

    fn controllers(&mut self) -> Vec<&mut dyn ControllerConfig> {
        self.pads
            .iter_mut()
            .map(|pad| pad as &mut dyn ControllerConfig)
            .collect()
    }

    fn update_device_list(&mut self) -> DeviceListChange {
        let mut change = DeviceListChange::default();
        for identifier in self.unplugged.drain(..) {
            let before = self.pads.len();
            self.pads.retain(|pad| pad.identifier != identifier);
            if self.pads.len() != before {
                change.removed.push(identifier);
            }
        }
        for pad in self.pending.drain(..) {
            change.added.push(pad.identifier.clone());
            self.pads.push(pad);
        }
        change
    }

    fn device_list_dirty(&self) -> bool {
        !self.pending.is_empty() || !self.unplugged.is_empty()
    }

    fn poll(&mut self, focused: bool) -> Vec<KeyEvent> {
        self.pads
            .iter_mut()
            .flat_map(|pad| pad.poll(focused))
            .collect()
    }

    fn axes(&mut self, axes: &mut [f32; NUM_JOY_AXIS]) {
        for pad in &self.pads {
            if pad.enabled {
                pad.axes.accumulate(&pad.raw_axes, pad.sensitivity, axes);
            }
        }
    }

    fn apply_feedback(&mut self, feedback: FeedbackSettings) {
        for pad in self.pads.iter_mut().chain(self.pending.iter_mut()) {
            pad.feedback = feedback;
        }
    }
}
