//! Force-feedback accumulation with time decay.
//!
//! Two channels (left = strong motor, right = weak motor) are kept in
//! `[0, 1]`. A request latches a magnitude and a timestamp. After a short
//! grace window the magnitude drains linearly, reaching zero
//! [`RUMBLE_DECAY_SECONDS`] later.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

/// No decay is applied while a request is younger than this.
pub const RUMBLE_GRACE_SECONDS: f64 = 0.04;
/// Time for a full-strength channel to drain once past the grace window.
pub const RUMBLE_DECAY_SECONDS: f64 = 0.4;
/// Upper bound on the elapsed time fed into the decay.
pub const RUMBLE_MAX_ELAPSED_SECONDS: f64 = 10.0;

/// Monotonic clock in seconds.
pub trait TimeSource {
    fn now_seconds(&self) -> f64;
}

/// Wall-independent clock anchored at construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to. Lets tests simulate elapsed time.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl TimeSource for ManualClock {
    fn now_seconds(&self) -> f64 {
        self.now.get()
    }
}

pub type SharedClock = Rc<dyn TimeSource>;

/// What happened to a rumble request at the hardware boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RumbleOutcome {
    /// Forwarded to the motors.
    Applied,
    /// The device has no motors or the provider has no rumble support.
    Unsupported,
    /// Feedback is switched off in the settings.
    Suppressed,
    /// The driver rejected the effect; already logged.
    Failed,
}

/// Decaying two-channel rumble state owned by one controller.
pub struct RumbleController {
    clock: SharedClock,
    left: f64,
    right: f64,
    latched_left: f64,
    latched_right: f64,
    stamp: f64,
}

impl fmt::Debug for RumbleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RumbleController")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("stamp", &self.stamp)
            .finish_non_exhaustive()
    }
}

impl RumbleController {
    pub fn new(clock: SharedClock) -> Self {
        let stamp = clock.now_seconds();
        Self {
            clock,
            left: 0.0,
            right: 0.0,
            latched_left: 0.0,
            latched_right: 0.0,
            stamp,
        }
    }

    /// Current (decayed as of the last update) channel values.
    pub fn channels(&self) -> (f32, f32) {
        (self.left as f32, self.right as f32)
    }

    pub fn is_idle(&self) -> bool {
        self.left <= f64::EPSILON && self.right <= f64::EPSILON
    }

    /// Replaces both channels and restarts the decay. Returns the values to
    /// forward to the hardware.
    pub fn set(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.latch(f64::from(left), f64::from(right))
    }

    /// Adds onto the channels as decayed right now, so repeated triggers
    /// build up instead of overwriting each other.
    pub fn add(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.update();
        let left = self.left + f64::from(left);
        let right = self.right + f64::from(right);
        self.latch(left, right)
    }

    /// Applies the decay for the current time. Does not touch the hardware.
    ///
    /// A request younger than [`RUMBLE_GRACE_SECONDS`] (boundary included)
    /// is left untouched.
    pub fn update(&mut self) {
        let now = self.clock.now_seconds();
        let elapsed = (now - (self.stamp + RUMBLE_GRACE_SECONDS))
            .clamp(0.0, RUMBLE_MAX_ELAPSED_SECONDS);
        let drained = elapsed / RUMBLE_DECAY_SECONDS;
        self.left = clamp_channel(self.latched_left - drained);
        self.right = clamp_channel(self.latched_right - drained);
    }

    fn latch(&mut self, left: f64, right: f64) -> (f32, f32) {
        self.left = clamp_channel(left);
        self.right = clamp_channel(right);
        self.latched_left = self.left;
        self.latched_right = self.right;
        self.stamp = self.clock.now_seconds();
        debug!(
            "Rumble latched at {:.3}s: left {:.3}, right {:.3}",
            self.stamp, self.left, self.right
        );
        self.channels()
    }
}

fn clamp_channel(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
