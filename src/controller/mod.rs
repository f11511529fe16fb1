//! Controller subsystem for gamepad and joystick input
//!
//! Signal-conditioning and state primitives shared by every platform
//! provider:
//!
//! 1. [`deadzone`] - Dead-zone removal and stick-to-direction conversion
//! 2. [`buttons`] - Edge detection from polled button masks
//! 3. [`rumble`] - Two-channel force feedback with time-based decay
//! 4. [`axis`] - Per-axis dead zone, scale and logical mapping
//! 5. [`config`] - The [`ControllerConfig`] capability interface
//! 6. [`provider`] / [`gilrs_backend`] - Device discovery and polling
//! 7. [`manager`] - Per-frame driver with profile persistence
//!
//! # Data flow
//!
//! ```text
//! Device ──► Provider::poll ──► ButtonTracker ──► KeyEvent
//!        └─► raw axes ──► AxisTable::accumulate ──► [f32; NUM_JOY_AXIS]
//! ```
//!
//! Everything runs on the caller's thread, once per frame.

pub mod axis;
pub mod buttons;
pub mod config;
pub mod deadzone;
pub mod gilrs_backend;
pub mod manager;
pub mod provider;
pub mod rumble;

#[cfg(test)]
pub(crate) mod testing;

pub use axis::{AxisDefaults, AxisTable, JoyAxis, NUM_JOY_AXIS};
pub use buttons::{generate_button_events, ButtonTracker, KeyEvent, KeyMapping, KeyState};
pub use config::ControllerConfig;
pub use gilrs_backend::{GilrsController, GilrsProvider};
pub use manager::InputManager;
pub use provider::{ControllerProvider, DeviceListChange};
pub use rumble::{MonotonicClock, RumbleController, RumbleOutcome, SharedClock, TimeSource};
