//! Logical axes and the per-axis settings every controller carries.

use std::fmt;

use tracing::debug;

use super::deadzone::adjust_axis;

/// Game-meaning axis a physical axis can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JoyAxis {
    /// Polled but excluded from movement.
    #[default]
    None,
    Yaw,
    Pitch,
    Forward,
    Side,
    Up,
}

/// Number of logical axes that carry movement (everything except `None`).
pub const NUM_JOY_AXIS: usize = 5;

pub const DEFAULT_SENSITIVITY: f32 = 1.0;
pub const DEFAULT_AXIS_SCALE: f32 = 1.0;

impl JoyAxis {
    pub const MOVEMENT: [JoyAxis; NUM_JOY_AXIS] = [
        JoyAxis::Yaw,
        JoyAxis::Pitch,
        JoyAxis::Forward,
        JoyAxis::Side,
        JoyAxis::Up,
    ];

    /// Slot in a `[f32; NUM_JOY_AXIS]` movement array.
    pub fn index(self) -> Option<usize> {
        match self {
            JoyAxis::None => None,
            JoyAxis::Yaw => Some(0),
            JoyAxis::Pitch => Some(1),
            JoyAxis::Forward => Some(2),
            JoyAxis::Side => Some(3),
            JoyAxis::Up => Some(4),
        }
    }

    /// Stable integer form used in saved profiles (`None` is -1).
    pub fn to_raw(self) -> i32 {
        self.index().map_or(-1, |i| i as i32)
    }

    /// Inverse of [`JoyAxis::to_raw`]; out-of-range values are clamped so a
    /// damaged profile still yields a valid mapping.
    pub fn from_raw(raw: i32) -> Self {
        let clamped = raw.clamp(-1, NUM_JOY_AXIS as i32 - 1);
        usize::try_from(clamped)
            .ok()
            .map_or(JoyAxis::None, |i| Self::MOVEMENT[i])
    }
}

impl fmt::Display for JoyAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoyAxis::None => write!(f, "None"),
            JoyAxis::Yaw => write!(f, "Yaw"),
            JoyAxis::Pitch => write!(f, "Pitch"),
            JoyAxis::Forward => write!(f, "Forward"),
            JoyAxis::Side => write!(f, "Side"),
            JoyAxis::Up => write!(f, "Up"),
        }
    }
}

/// Factory settings for one physical axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisDefaults {
    pub name: String,
    pub dead_zone: f32,
    pub scale: f32,
    pub map: JoyAxis,
}

impl AxisDefaults {
    pub fn new(name: impl Into<String>, dead_zone: f32, map: JoyAxis) -> Self {
        Self {
            name: name.into(),
            dead_zone,
            scale: DEFAULT_AXIS_SCALE,
            map,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct AxisSettings {
    dead_zone: f32,
    scale: f32,
    map: JoyAxis,
}

impl From<&AxisDefaults> for AxisSettings {
    fn from(defaults: &AxisDefaults) -> Self {
        Self {
            dead_zone: defaults.dead_zone,
            scale: defaults.scale,
            map: defaults.map,
        }
    }
}

/// Current and default settings for every axis of one device.
///
/// Concrete controllers embed one of these and forward the per-axis part of
/// [`super::config::ControllerConfig`] to it. Indices at or past
/// [`AxisTable::len`] violate the caller contract: debug builds assert,
/// release builds read neutral values and drop writes.
#[derive(Clone, Debug)]
pub struct AxisTable {
    defaults: Vec<AxisDefaults>,
    current: Vec<AxisSettings>,
}

impl AxisTable {
    pub fn new(defaults: Vec<AxisDefaults>) -> Self {
        let current = defaults.iter().map(AxisSettings::from).collect();
        Self { defaults, current }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    fn checked(&self, axis: usize) -> Option<(&AxisSettings, &AxisDefaults)> {
        debug_assert!(
            axis < self.current.len(),
            "axis {} out of range, device has {} axes",
            axis,
            self.current.len()
        );
        self.current.get(axis).zip(self.defaults.get(axis))
    }

    fn checked_mut(&mut self, axis: usize) -> Option<&mut AxisSettings> {
        debug_assert!(
            axis < self.current.len(),
            "axis {} out of range, device has {} axes",
            axis,
            self.current.len()
        );
        self.current.get_mut(axis)
    }

    pub fn name(&self, axis: usize) -> &str {
        self.checked(axis).map_or("", |(_, d)| d.name.as_str())
    }

    pub fn dead_zone(&self, axis: usize) -> f32 {
        self.checked(axis).map_or(0.0, |(s, _)| s.dead_zone)
    }

    /// Stores `zone` clamped to `[0, 1]`.
    pub fn set_dead_zone(&mut self, axis: usize, zone: f32) {
        if let Some(settings) = self.checked_mut(axis) {
            settings.dead_zone = zone.clamp(0.0, 1.0);
        }
    }

    pub fn scale(&self, axis: usize) -> f32 {
        self.checked(axis).map_or(0.0, |(s, _)| s.scale)
    }

    pub fn set_scale(&mut self, axis: usize, scale: f32) {
        if let Some(settings) = self.checked_mut(axis) {
            settings.scale = scale;
        }
    }

    pub fn map(&self, axis: usize) -> JoyAxis {
        self.checked(axis).map_or(JoyAxis::None, |(s, _)| s.map)
    }

    pub fn set_map(&mut self, axis: usize, map: JoyAxis) {
        if let Some(settings) = self.checked_mut(axis) {
            settings.map = map;
        }
    }

    pub fn is_dead_zone_default(&self, axis: usize) -> bool {
        self.checked(axis)
            .map_or(true, |(s, d)| s.dead_zone == d.dead_zone)
    }

    pub fn is_scale_default(&self, axis: usize) -> bool {
        self.checked(axis).map_or(true, |(s, d)| s.scale == d.scale)
    }

    pub fn is_map_default(&self, axis: usize) -> bool {
        self.checked(axis).map_or(true, |(s, d)| s.map == d.map)
    }

    pub fn reset(&mut self) {
        debug!("Resetting {} axes to defaults", self.defaults.len());
        self.current = self.defaults.iter().map(AxisSettings::from).collect();
    }

    /// Feeds raw readings through dead zone, axis scale and `sensitivity`,
    /// adding each result into the slot of its logical axis. Axes mapped to
    /// [`JoyAxis::None`] are skipped.
    pub fn accumulate(&self, raw: &[f32], sensitivity: f32, out: &mut [f32; NUM_JOY_AXIS]) {
        for (settings, value) in self.current.iter().zip(raw) {
            let Some(slot) = settings.map.index() else {
                continue;
            };
            let adjusted = adjust_axis(f64::from(*value), f64::from(settings.dead_zone)) as f32;
            out[slot] += adjusted * settings.scale * sensitivity;
        }
    }
}
