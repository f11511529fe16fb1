//! Engine key codes produced by controller polling.
//!
//! Controllers never talk to the engine in terms of device buttons. Every
//! press or release becomes a [`KeyCode`] from one of the ranges below so the
//! binding layer can treat pads, sticks and keyboards alike.

/// Engine key identifier.
pub type KeyCode = u16;

/// Marks an unused slot in a key lookup table.
pub const NO_KEY: KeyCode = 0;

/// First of the generic joystick buttons (`JOY1` .. `JOY128`).
pub const JOY_BUTTON_BASE: KeyCode = 0x100;
pub const NUM_JOY_BUTTONS: u16 = 128;

/// Left stick as a D-pad, ordered up, right, down, left to match the
/// `STICK_*` bits of [`crate::controller::deadzone::xy_axes_to_buttons`].
pub const LTHUMB_BASE: KeyCode = 0x1B0;
pub const RTHUMB_BASE: KeyCode = 0x1B4;

pub const PAD_DPAD_UP: KeyCode = 0x1B8;
pub const PAD_DPAD_DOWN: KeyCode = 0x1B9;
pub const PAD_DPAD_LEFT: KeyCode = 0x1BA;
pub const PAD_DPAD_RIGHT: KeyCode = 0x1BB;
pub const PAD_START: KeyCode = 0x1BC;
pub const PAD_BACK: KeyCode = 0x1BD;
pub const PAD_LTHUMB: KeyCode = 0x1BE;
pub const PAD_RTHUMB: KeyCode = 0x1BF;
pub const PAD_LSHOULDER: KeyCode = 0x1C0;
pub const PAD_RSHOULDER: KeyCode = 0x1C1;
pub const PAD_LTRIGGER: KeyCode = 0x1C2;
pub const PAD_RTRIGGER: KeyCode = 0x1C3;
pub const PAD_A: KeyCode = 0x1C4;
pub const PAD_B: KeyCode = 0x1C5;
pub const PAD_X: KeyCode = 0x1C6;
pub const PAD_Y: KeyCode = 0x1C7;
pub const PAD_GUIDE: KeyCode = 0x1C8;

const THUMB_DIRECTIONS: [&str; 4] = ["UP", "RIGHT", "DOWN", "LEFT"];

/// Human readable name for a controller key, used for logging and menus.
pub fn key_name(key: KeyCode) -> Option<String> {
    let name = match key {
        k if (JOY_BUTTON_BASE..JOY_BUTTON_BASE + NUM_JOY_BUTTONS).contains(&k) => {
            return Some(format!("JOY{}", k - JOY_BUTTON_BASE + 1));
        }
        k if (LTHUMB_BASE..LTHUMB_BASE + 4).contains(&k) => {
            return Some(format!(
                "LSTICK_{}",
                THUMB_DIRECTIONS[usize::from(k - LTHUMB_BASE)]
            ));
        }
        k if (RTHUMB_BASE..RTHUMB_BASE + 4).contains(&k) => {
            return Some(format!(
                "RSTICK_{}",
                THUMB_DIRECTIONS[usize::from(k - RTHUMB_BASE)]
            ));
        }
        PAD_DPAD_UP => "DPAD_UP",
        PAD_DPAD_DOWN => "DPAD_DOWN",
        PAD_DPAD_LEFT => "DPAD_LEFT",
        PAD_DPAD_RIGHT => "DPAD_RIGHT",
        PAD_START => "PAD_START",
        PAD_BACK => "PAD_BACK",
        PAD_LTHUMB => "LTHUMB",
        PAD_RTHUMB => "RTHUMB",
        PAD_LSHOULDER => "LSHOULDER",
        PAD_RSHOULDER => "RSHOULDER",
        PAD_LTRIGGER => "LTRIGGER",
        PAD_RTRIGGER => "RTRIGGER",
        PAD_A => "PAD_A",
        PAD_B => "PAD_B",
        PAD_X => "PAD_X",
        PAD_Y => "PAD_Y",
        PAD_GUIDE => "PAD_GUIDE",
        _ => return None,
    };
    Some(name.to_string())
}
