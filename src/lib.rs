//! Game-controller configuration and feedback core.
//!
//! Conditions raw stick and trigger readings, turns polled button state into
//! key events, tracks decaying rumble per device and persists per-device
//! settings between sessions.

pub mod config;
pub mod controller;
pub mod error;
pub mod keys;
pub mod persistence;

pub use config::Settings;
pub use error::JoyError;
