//! Edge-triggered key events from polled button bitmasks.
//!
//! Providers sample their buttons into a `u32` each poll (bit `n` = button
//! `n`). Diffing the previous and current snapshot is the only way polled
//! state becomes discrete key presses and releases for the engine.

use chrono::{DateTime, Local};
use tracing::debug;

use crate::keys::{KeyCode, NO_KEY};

/// Widest mask a single diff can cover.
pub const MAX_MASK_BUTTONS: usize = u32::BITS as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Discrete key transition emitted towards the engine.
#[derive(Clone, Debug)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub state: KeyState,
    pub timestamp: DateTime<Local>,
}

impl KeyEvent {
    pub fn is_pressed(&self) -> bool {
        self.state == KeyState::Pressed
    }
}

/// How a button index turns into a key code.
#[derive(Clone, Copy, Debug)]
pub enum KeyMapping<'a> {
    /// Contiguous range: button `n` is `base + n`.
    Base(KeyCode),
    /// Explicit table indexed by button; [`NO_KEY`] entries are skipped.
    Table(&'a [KeyCode]),
}

impl KeyMapping<'_> {
    fn key_for(&self, index: usize) -> Option<KeyCode> {
        match self {
            KeyMapping::Base(base) => u16::try_from(index)
                .ok()
                .and_then(|offset| base.checked_add(offset)),
            KeyMapping::Table(keys) => keys.get(index).copied().filter(|key| *key != NO_KEY),
        }
    }

    fn limit(&self) -> usize {
        match self {
            KeyMapping::Base(_) => MAX_MASK_BUTTONS,
            KeyMapping::Table(keys) => keys.len(),
        }
    }
}

/// Compares two snapshots over the first `num_buttons` bits and returns one
/// event per changed bit, in ascending button order.
pub fn generate_button_events(
    old_buttons: u32,
    new_buttons: u32,
    num_buttons: usize,
    keys: KeyMapping<'_>,
) -> Vec<KeyEvent> {
    debug_assert!(
        num_buttons <= MAX_MASK_BUTTONS,
        "button mask holds at most {} buttons, got {}",
        MAX_MASK_BUTTONS,
        num_buttons
    );
    debug_assert!(
        num_buttons <= keys.limit(),
        "key table has {} entries for {} buttons",
        keys.limit(),
        num_buttons
    );

    let changed = old_buttons ^ new_buttons;
    if changed == 0 {
        return Vec::new();
    }

    let count = num_buttons.min(MAX_MASK_BUTTONS).min(keys.limit());
    let now = Local::now();
    let mut events = Vec::new();

    for index in 0..count {
        let mask = 1u32 << index;
        if changed & mask == 0 {
            continue;
        }
        let Some(key) = keys.key_for(index) else {
            continue;
        };
        let state = if new_buttons & mask != 0 {
            KeyState::Pressed
        } else {
            KeyState::Released
        };
        debug!("Button {} -> key {:#x} {:?}", index, key, state);
        events.push(KeyEvent {
            key,
            state,
            timestamp: now,
        });
    }

    events
}

/// Remembers the previous snapshot of one button group between polls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonTracker {
    mask: u32,
}

impl ButtonTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Diffs `new_buttons` against the stored snapshot, then keeps it.
    pub fn update(
        &mut self,
        new_buttons: u32,
        num_buttons: usize,
        keys: KeyMapping<'_>,
    ) -> Vec<KeyEvent> {
        let events = generate_button_events(self.mask, new_buttons, num_buttons, keys);
        self.mask = new_buttons;
        events
    }

    /// Releases everything still held, e.g. when a device is disabled.
    pub fn release_all(&mut self, num_buttons: usize, keys: KeyMapping<'_>) -> Vec<KeyEvent> {
        self.update(0, num_buttons, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{JOY_BUTTON_BASE, PAD_A, PAD_B, PAD_X};

    fn summary(events: &[KeyEvent]) -> Vec<(KeyCode, KeyState)> {
        events.iter().map(|e| (e.key, e.state)).collect()
    }

    #[test]
    fn press_and_release_from_bit_flips() {
        let events = generate_button_events(0b0110, 0b0101, 4, KeyMapping::Base(JOY_BUTTON_BASE));
        assert_eq!(
            summary(&events),
            vec![
                (JOY_BUTTON_BASE, KeyState::Pressed),
                (JOY_BUTTON_BASE + 1, KeyState::Released),
            ]
        );
    }

    #[test]
    fn unchanged_masks_emit_nothing() {
        assert!(
            generate_button_events(0b1011, 0b1011, 4, KeyMapping::Base(JOY_BUTTON_BASE)).is_empty()
        );
        assert!(generate_button_events(0, 0, 32, KeyMapping::Base(JOY_BUTTON_BASE)).is_empty());
    }

    #[test]
    fn bits_past_num_buttons_are_ignored() {
        let events = generate_button_events(0, 0b1_0000, 4, KeyMapping::Base(JOY_BUTTON_BASE));
        assert!(events.is_empty());
    }

    #[test]
    fn table_lookup_skips_unbound_entries() {
        let table = [PAD_A, NO_KEY, PAD_X];
        let events = generate_button_events(0b000, 0b111, 3, KeyMapping::Table(&table));
        assert_eq!(
            summary(&events),
            vec![(PAD_A, KeyState::Pressed), (PAD_X, KeyState::Pressed)]
        );

        let events = generate_button_events(0b111, 0b010, 3, KeyMapping::Table(&table));
        assert_eq!(
            summary(&events),
            vec![(PAD_A, KeyState::Released), (PAD_X, KeyState::Released)]
        );
    }

    #[test]
    fn highest_bit_is_reachable() {
        let events = generate_button_events(0, 1 << 31, 32, KeyMapping::Base(JOY_BUTTON_BASE));
        assert_eq!(summary(&events), vec![(JOY_BUTTON_BASE + 31, KeyState::Pressed)]);
    }

    #[test]
    fn tracker_keeps_previous_snapshot() {
        let table = [PAD_A, PAD_B];
        let mut tracker = ButtonTracker::new();

        let first = tracker.update(0b01, 2, KeyMapping::Table(&table));
        assert_eq!(summary(&first), vec![(PAD_A, KeyState::Pressed)]);

        assert!(tracker.update(0b01, 2, KeyMapping::Table(&table)).is_empty());

        let third = tracker.update(0b10, 2, KeyMapping::Table(&table));
        assert_eq!(
            summary(&third),
            vec![(PAD_A, KeyState::Released), (PAD_B, KeyState::Pressed)]
        );

        let released = tracker.release_all(2, KeyMapping::Table(&table));
        assert_eq!(summary(&released), vec![(PAD_B, KeyState::Released)]);
        assert_eq!(tracker.mask(), 0);
    }
}
