//! Dead-zone conditioning for analog axes.

/// Set when an axis is pushed past its dead zone in the positive direction.
pub const AXIS_PLUS: u8 = 0x01;
/// Set when an axis is pushed past its dead zone in the negative direction.
pub const AXIS_MINUS: u8 = 0x02;

/// Direction bits produced by [`xy_axes_to_buttons`].
pub const STICK_UP: u8 = 0x01;
pub const STICK_RIGHT: u8 = 0x02;
pub const STICK_DOWN: u8 = 0x04;
pub const STICK_LEFT: u8 = 0x08;

/// A stick has to be pushed past this fraction of its travel on an axis
/// before that direction counts as held.
pub const STICK_BUTTON_THRESHOLD: f64 = 0.5;

/// Flattens `axis_value` inside `dead_zone` and rescales the remainder so
/// that `[dead_zone, 1]` maps onto `[0, 1]`, keeping the sign.
///
/// The second element carries [`AXIS_PLUS`] or [`AXIS_MINUS`] for callers
/// that synthesize digital buttons from an analog axis. A dead zone of 1 or
/// more swallows every input; a dead zone of 0 or less passes values through.
pub fn remove_dead_zone(axis_value: f64, dead_zone: f64) -> (f64, u8) {
    if !axis_value.is_finite() || dead_zone >= 1.0 {
        return (0.0, 0);
    }
    let dead_zone = dead_zone.max(0.0);
    let magnitude = axis_value.abs();

    if magnitude < dead_zone || axis_value == 0.0 {
        return (0.0, 0);
    }

    let scaled = ((magnitude - dead_zone) / (1.0 - dead_zone)).min(1.0);
    // exactly on the edge conditions to zero, so no direction either
    if scaled <= 0.0 {
        return (0.0, 0);
    }
    if axis_value < 0.0 {
        (-scaled, AXIS_MINUS)
    } else {
        (scaled, AXIS_PLUS)
    }
}

/// [`remove_dead_zone`] without the button bits.
pub fn adjust_axis(axis_value: f64, dead_zone: f64) -> f64 {
    remove_dead_zone(axis_value, dead_zone).0
}

/// Turns a stick position into D-pad style direction bits.
///
/// Each axis is thresholded on its own at [`STICK_BUTTON_THRESHOLD`], so a
/// diagonal yields two bits. Positive `y` is up.
pub fn xy_axes_to_buttons(x: f64, y: f64) -> u8 {
    let mut buttons = 0;
    if x >= STICK_BUTTON_THRESHOLD {
        buttons |= STICK_RIGHT;
    } else if x <= -STICK_BUTTON_THRESHOLD {
        buttons |= STICK_LEFT;
    }
    if y >= STICK_BUTTON_THRESHOLD {
        buttons |= STICK_UP;
    } else if y <= -STICK_BUTTON_THRESHOLD {
        buttons |= STICK_DOWN;
    }
    buttons
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn values_inside_dead_zone_are_zero() {
        for dz in [0.1, 0.25, 0.5, 0.9] {
            for step in 0..100 {
                let x = dz * f64::from(step) / 100.0;
                assert_eq!(remove_dead_zone(x, dz), (0.0, 0));
                assert_eq!(remove_dead_zone(-x, dz), (0.0, 0));
            }
        }
    }

    #[test]
    fn values_outside_dead_zone_keep_sign_and_range() {
        let dz = 0.2;
        for step in 1..=80 {
            let x = dz + f64::from(step) / 100.0;
            let (pos, pos_bits) = remove_dead_zone(x, dz);
            let (neg, neg_bits) = remove_dead_zone(-x, dz);
            assert!((0.0..=1.0).contains(&pos), "{} -> {}", x, pos);
            assert!((-1.0..=0.0).contains(&neg), "{} -> {}", -x, neg);
            assert!((pos + neg).abs() < EPSILON);
            assert_eq!(pos_bits, AXIS_PLUS);
            assert_eq!(neg_bits, AXIS_MINUS);
        }
    }

    #[test]
    fn dead_zone_edge_maps_to_zero_and_full_travel_to_one() {
        for dz in [0.0, 0.15, 0.5, 0.75] {
            assert!(adjust_axis(dz, dz).abs() < EPSILON);
            assert!((adjust_axis(1.0, dz) - 1.0).abs() < EPSILON);
            assert!((adjust_axis(-1.0, dz) + 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn edge_of_dead_zone_sets_no_direction() {
        assert_eq!(remove_dead_zone(0.25, 0.25), (0.0, 0));
        assert_eq!(remove_dead_zone(-0.25, 0.25), (0.0, 0));
        assert_eq!(remove_dead_zone(0.1, 0.1).1 & AXIS_PLUS, 0);
    }

    #[test]
    fn rescales_linearly() {
        assert!((adjust_axis(0.6, 0.2) - 0.5).abs() < EPSILON);
        assert!((adjust_axis(-0.6, 0.2) + 0.5).abs() < EPSILON);
    }

    #[test]
    fn full_dead_zone_swallows_everything() {
        assert_eq!(remove_dead_zone(1.0, 1.0), (0.0, 0));
        assert_eq!(remove_dead_zone(-1.0, 1.5), (0.0, 0));
        assert_eq!(remove_dead_zone(0.3, 1.0), (0.0, 0));
    }

    #[test]
    fn non_positive_dead_zone_passes_through() {
        assert_eq!(remove_dead_zone(0.3, 0.0), (0.3, AXIS_PLUS));
        assert_eq!(remove_dead_zone(-0.01, -0.5), (-0.01, AXIS_MINUS));
        assert_eq!(remove_dead_zone(0.0, 0.0), (0.0, 0));
    }

    #[test]
    fn garbage_input_is_neutral() {
        assert_eq!(remove_dead_zone(f64::NAN, 0.1), (0.0, 0));
        assert_eq!(remove_dead_zone(f64::INFINITY, 0.1), (0.0, 0));
    }

    #[test]
    fn stick_directions() {
        assert_eq!(xy_axes_to_buttons(0.9, -0.9), STICK_RIGHT | STICK_DOWN);
        assert_eq!(xy_axes_to_buttons(-0.6, 0.7), STICK_LEFT | STICK_UP);
        assert_eq!(xy_axes_to_buttons(0.5, 0.0), STICK_RIGHT);
        assert_eq!(xy_axes_to_buttons(0.49, -0.49), 0);
        assert_eq!(xy_axes_to_buttons(0.0, 0.0), 0);
    }
}
