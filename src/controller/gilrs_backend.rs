//! Controllers discovered through gilrs.
//!
//! Every connected gamepad becomes one [`GilrsController`] exposing six axes
//! (both sticks and both analog triggers). Face, shoulder, menu and d-pad
//! buttons map onto the `PAD_*` keys; stick directions and trigger pulls
//! additionally produce the `LTHUMB`/`RTHUMB`/`PAD_*TRIGGER` keys so menus can
//! be driven without digital buttons.

use std::cell::RefCell;
use std::rc::Rc;

use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Envelope, Repeat, Replay, Ticks};
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::FeedbackSettings;
use crate::error::JoyError;
use crate::keys::{
    KeyCode, LTHUMB_BASE, PAD_A, PAD_B, PAD_BACK, PAD_DPAD_DOWN, PAD_DPAD_LEFT, PAD_DPAD_RIGHT,
    PAD_DPAD_UP, PAD_GUIDE, PAD_LSHOULDER, PAD_LTHUMB, PAD_LTRIGGER, PAD_RSHOULDER, PAD_RTHUMB,
    PAD_RTRIGGER, PAD_START, PAD_X, PAD_Y, RTHUMB_BASE,
};

use super::axis::{AxisDefaults, AxisTable, JoyAxis, DEFAULT_SENSITIVITY, NUM_JOY_AXIS};
use super::buttons::{ButtonTracker, KeyEvent, KeyMapping};
use super::config::{rumble_not_implemented, ControllerConfig};
use super::deadzone::{adjust_axis, remove_dead_zone, xy_axes_to_buttons, AXIS_PLUS};
use super::provider::{contributes_input, ControllerProvider, DeviceListChange};
use super::rumble::{
    RumbleController, RumbleOutcome, SharedClock, RUMBLE_DECAY_SECONDS, RUMBLE_GRACE_SECONDS,
};

const LEFT_X: usize = 0;
const LEFT_Y: usize = 1;
const RIGHT_X: usize = 2;
const RIGHT_Y: usize = 3;
const LEFT_TRIGGER: usize = 4;
const RIGHT_TRIGGER: usize = 5;
const GILRS_AXES: usize = 6;

const STICK_BUTTONS: usize = 4;
const TRIGGER_KEYS: [KeyCode; 2] = [PAD_LTRIGGER, PAD_RTRIGGER];

const PAD_BUTTONS: [Button; 15] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

const PAD_KEYS: [KeyCode; 15] = [
    PAD_A,
    PAD_B,
    PAD_X,
    PAD_Y,
    PAD_LSHOULDER,
    PAD_RSHOULDER,
    PAD_BACK,
    PAD_START,
    PAD_GUIDE,
    PAD_LTHUMB,
    PAD_RTHUMB,
    PAD_DPAD_UP,
    PAD_DPAD_DOWN,
    PAD_DPAD_LEFT,
    PAD_DPAD_RIGHT,
];

fn default_axes() -> AxisTable {
    AxisTable::new(vec![
        AxisDefaults::new("Left Stick X", 0.25, JoyAxis::Side),
        AxisDefaults::new("Left Stick Y", 0.25, JoyAxis::Forward),
        AxisDefaults::new("Right Stick X", 0.25, JoyAxis::Yaw),
        AxisDefaults::new("Right Stick Y", 0.25, JoyAxis::Pitch),
        AxisDefaults::new("Left Trigger", 0.1, JoyAxis::None),
        AxisDefaults::new("Right Trigger", 0.1, JoyAxis::None),
    ])
}

/// `name:uuid` with the uuid in simple (undashed lowercase) form.
fn device_identifier(name: &str, uuid: [u8; 16]) -> String {
    format!("{}:{}", name, Uuid::from_bytes(uuid).simple())
}

/// Appends `#2`, `#3`, ... until `taken` no longer matches, so two identical
/// pads keep separate profiles.
fn unique_identifier(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}#{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn motor_magnitude(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * f32::from(u16::MAX)).round() as u16
}

fn stick_buttons(x: f32, y: f32, dead_zone_x: f32, dead_zone_y: f32) -> u32 {
    let x = adjust_axis(f64::from(x), f64::from(dead_zone_x));
    let y = adjust_axis(f64::from(y), f64::from(dead_zone_y));
    u32::from(xy_axes_to_buttons(x, y))
}

fn trigger_buttons(left: f32, right: f32, dead_zone_left: f32, dead_zone_right: f32) -> u32 {
    let pulled = |value: f32, zone: f32| {
        remove_dead_zone(f64::from(value), f64::from(zone)).1 & AXIS_PLUS != 0
    };
    u32::from(pulled(left, dead_zone_left)) | u32::from(pulled(right, dead_zone_right)) << 1
}

#[derive(Clone, Copy, Debug, Default)]
struct Sample {
    axes: [f32; GILRS_AXES],
    buttons: u32,
}

/// One gamepad known to gilrs.
pub struct GilrsController {
    gilrs: Rc<RefCell<Gilrs>>,
    id: GamepadId,
    name: String,
    identifier: String,
    axes: AxisTable,
    sensitivity: f32,
    enabled: bool,
    enabled_in_background: bool,
    rumble: RumbleController,
    feedback: FeedbackSettings,
    ff_supported: bool,
    effect: Option<Effect>,
    raw: [f32; GILRS_AXES],
    buttons: ButtonTracker,
    left_stick: ButtonTracker,
    right_stick: ButtonTracker,
    triggers: ButtonTracker,
}

impl GilrsController {
    fn new(
        gilrs: Rc<RefCell<Gilrs>>,
        id: GamepadId,
        name: String,
        identifier: String,
        ff_supported: bool,
        clock: SharedClock,
        feedback: FeedbackSettings,
    ) -> Self {
        Self {
            gilrs,
            id,
            name,
            identifier,
            axes: default_axes(),
            sensitivity: DEFAULT_SENSITIVITY,
            enabled: true,
            enabled_in_background: false,
            rumble: RumbleController::new(clock),
            feedback,
            ff_supported,
            effect: None,
            raw: [0.0; GILRS_AXES],
            buttons: ButtonTracker::new(),
            left_stick: ButtonTracker::new(),
            right_stick: ButtonTracker::new(),
            triggers: ButtonTracker::new(),
        }
    }

    fn sample(&self) -> Sample {
        let gilrs = self.gilrs.borrow();
        let Some(pad) = gilrs.connected_gamepad(self.id) else {
            return Sample::default();
        };

        let buttons = PAD_BUTTONS
            .iter()
            .enumerate()
            .filter(|(_, button)| pad.is_pressed(**button))
            .fold(0u32, |mask, (index, _)| mask | 1 << index);
        let analog = |button| pad.button_data(button).map_or(0.0, |data| data.value());

        Sample {
            axes: [
                pad.value(Axis::LeftStickX),
                pad.value(Axis::LeftStickY),
                pad.value(Axis::RightStickX),
                pad.value(Axis::RightStickY),
                analog(Button::LeftTrigger2),
                analog(Button::RightTrigger2),
            ],
            buttons,
        }
    }

    fn poll(&mut self, focused: bool) -> Vec<KeyEvent> {
        if !contributes_input(&*self, focused) {
            self.raw = [0.0; GILRS_AXES];
            return self.release_all();
        }

        let sample = self.sample();
        self.raw = sample.axes;
        let [lx, ly, rx, ry, lt, rt] = sample.axes;
        let zone = |axis| self.axes.dead_zone(axis);
        let left = stick_buttons(lx, ly, zone(LEFT_X), zone(LEFT_Y));
        let right = stick_buttons(rx, ry, zone(RIGHT_X), zone(RIGHT_Y));
        let triggers = trigger_buttons(lt, rt, zone(LEFT_TRIGGER), zone(RIGHT_TRIGGER));

        let mut events =
            self.buttons
                .update(sample.buttons, PAD_BUTTONS.len(), KeyMapping::Table(&PAD_KEYS));
        events.extend(
            self.left_stick
                .update(left, STICK_BUTTONS, KeyMapping::Base(LTHUMB_BASE)),
        );
        events.extend(
            self.right_stick
                .update(right, STICK_BUTTONS, KeyMapping::Base(RTHUMB_BASE)),
        );
        events.extend(self.triggers.update(
            triggers,
            TRIGGER_KEYS.len(),
            KeyMapping::Table(&TRIGGER_KEYS),
        ));
        events
    }

    fn release_all(&mut self) -> Vec<KeyEvent> {
        let mut events = self
            .buttons
            .release_all(PAD_BUTTONS.len(), KeyMapping::Table(&PAD_KEYS));
        events.extend(
            self.left_stick
                .release_all(STICK_BUTTONS, KeyMapping::Base(LTHUMB_BASE)),
        );
        events.extend(
            self.right_stick
                .release_all(STICK_BUTTONS, KeyMapping::Base(RTHUMB_BASE)),
        );
        events.extend(
            self.triggers
                .release_all(TRIGGER_KEYS.len(), KeyMapping::Table(&TRIGGER_KEYS)),
        );
        events
    }

    /// Uploads a strong/weak pair that fades out over the decay window.
    fn play_effect(&self, strong: f32, weak: f32) -> Result<Effect, JoyError> {
        let fade = Ticks::from_ms((RUMBLE_DECAY_SECONDS * 1000.0) as u32);
        let length =
            Ticks::from_ms(((RUMBLE_GRACE_SECONDS + RUMBLE_DECAY_SECONDS) * 1000.0) as u32);
        let motor = |kind| BaseEffect {
            kind,
            scheduling: Replay {
                play_for: length,
                ..Default::default()
            },
            envelope: Envelope {
                fade_length: fade,
                fade_level: 0.0,
                ..Default::default()
            },
        };

        let mut gilrs = self.gilrs.borrow_mut();
        let effect = EffectBuilder::new()
            .add_effect(motor(BaseEffectType::Strong {
                magnitude: motor_magnitude(strong),
            }))
            .add_effect(motor(BaseEffectType::Weak {
                magnitude: motor_magnitude(weak),
            }))
            .gamepads(&[self.id])
            .repeat(Repeat::For(length))
            .finish(&mut *gilrs)?;
        effect.play()?;
        Ok(effect)
    }
}

impl ControllerConfig for GilrsController {
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

    // gilrs keeps receiving events without window focus
    fn allows_enabled_in_background(&self) -> bool {
        true
    }

    fn enabled_in_background(&self) -> bool {
        self.enabled_in_background
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
        if !self.ff_supported {
            return rumble_not_implemented(&self.name, left, right);
        }
        let Some((strong, weak)) = self.feedback.scaled(left, right) else {
            self.effect = None;
            return RumbleOutcome::Suppressed;
        };
        if strong <= 0.0 && weak <= 0.0 {
            self.effect = None;
            return RumbleOutcome::Applied;
        }

        match self.play_effect(strong, weak) {
            Ok(effect) => {
                debug!(
                    "Rumble {:.2}/{:.2} on {}",
                    strong, weak, self.identifier
                );
                self.effect = Some(effect);
                RumbleOutcome::Applied
            }
            Err(e) => {
                warn!("Rumble failed on {}: {}", self.identifier, e);
                RumbleOutcome::Failed
            }
        }
    }
}

/// Provider backed by a single gilrs context shared with its controllers.
pub struct GilrsProvider {
    gilrs: Rc<RefCell<Gilrs>>,
    clock: SharedClock,
    controllers: Vec<GilrsController>,
    feedback: FeedbackSettings,
    dirty: bool,
    pending_releases: Vec<KeyEvent>,
}

impl GilrsProvider {
    /// The first device refresh happens on the next
    /// [`ControllerProvider::update_device_list`].
    pub fn new(clock: SharedClock) -> Result<Self, JoyError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => {
                info!("Successfully initialized gilrs");
                gilrs
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(JoyError::Backend(e.to_string()));
            }
        };

        Ok(Self {
            gilrs: Rc::new(RefCell::new(gilrs)),
            clock,
            controllers: Vec::new(),
            feedback: FeedbackSettings::default(),
            dirty: true,
            pending_releases: Vec::new(),
        })
    }

    fn drain_events(&mut self) {
        let mut gilrs = self.gilrs.borrow_mut();
        while let Some(Event { id, event, .. }) = gilrs.next_event() {
            match event {
                EventType::Connected => {
                    info!("Gamepad {} connected", id);
                    self.dirty = true;
                }
                EventType::Disconnected => {
                    info!("Gamepad {} disconnected", id);
                    self.dirty = true;
                }
                _ => {}
            }
        }
    }
}

impl ControllerProvider for GilrsProvider {
    fn name(&self) -> &str {
        "gilrs"
    }

    fn controllers(&mut self) -> Vec<&mut dyn ControllerConfig> {
        self.controllers
            .iter_mut()
            .map(|controller| controller as &mut dyn ControllerConfig)
            .collect()
    }

    fn update_device_list(&mut self) -> DeviceListChange {
        self.drain_events();
        self.dirty = false;

        let connected: Vec<(GamepadId, String, [u8; 16], bool)> = self
            .gilrs
            .borrow()
            .gamepads()
            .map(|(id, pad)| (id, pad.name().to_string(), pad.uuid(), pad.is_ff_supported()))
            .collect();

        let mut change = DeviceListChange::default();
        let (kept, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut self.controllers)
            .into_iter()
            .partition(|controller| connected.iter().any(|(id, ..)| *id == controller.id));
        self.controllers = kept;
        for mut controller in gone {
            info!("Removed controller {}", controller.identifier);
            self.pending_releases.extend(controller.release_all());
            change.removed.push(controller.identifier);
        }

        for (id, name, uuid, ff_supported) in connected {
            if self.controllers.iter().any(|controller| controller.id == id) {
                continue;
            }
            let identifier = unique_identifier(device_identifier(&name, uuid), |candidate| {
                self.controllers
                    .iter()
                    .any(|controller| controller.identifier == candidate)
            });
            info!(
                "Added controller {} ({}), force feedback: {}",
                name, identifier, ff_supported
            );
            change.added.push(identifier.clone());
            self.controllers.push(GilrsController::new(
                self.gilrs.clone(),
                id,
                name,
                identifier,
                ff_supported,
                self.clock.clone(),
                self.feedback,
            ));
        }

        change
    }

    fn device_list_dirty(&self) -> bool {
        self.dirty
    }

    fn poll(&mut self, focused: bool) -> Vec<KeyEvent> {
        self.drain_events();
        let mut events = std::mem::take(&mut self.pending_releases);
        for controller in &mut self.controllers {
            events.extend(controller.poll(focused));
        }
        events
    }

    fn axes(&mut self, axes: &mut [f32; NUM_JOY_AXIS]) {
        for controller in &self.controllers {
            if controller.enabled {
                controller
                    .axes
                    .accumulate(&controller.raw, controller.sensitivity, axes);
            }
        }
    }

    fn apply_feedback(&mut self, feedback: FeedbackSettings) {
        self.feedback = feedback;
        for controller in &mut self.controllers {
            controller.feedback = feedback;
            if !feedback.enabled {
                controller.effect = None;
            }
        }
    }
}
