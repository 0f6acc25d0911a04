//! Rounding policy for fractional resource deltas.
//!
//! The three modes are intentionally not symmetric around zero:
//!
//! | Mode | `value >= 0` | `value < 0` |
//! |------|--------------|-------------|
//! | `up` | ceiling | floor |
//! | `down` | floor | ceiling |
//! | `nearest` | floor, +1 if remainder >= 0.5 | same rule (floor-based) |
//!
//! `nearest` always floors first and then looks at the unsigned remainder,
//! so `-2.5` becomes `-2` and `-2.6` becomes `-3`. Content relies on this
//! exact behaviour; do not replace it with `f64::round`.

use kingdom_types::RoundingMode;

/// Round `value` according to `mode`.
pub fn round(value: f64, mode: RoundingMode) -> f64 {
    match mode {
        RoundingMode::Up => {
            if value >= 0.0 {
                value.ceil()
            } else {
                value.floor()
            }
        }
        RoundingMode::Down => {
            if value >= 0.0 {
                value.floor()
            } else {
                value.ceil()
            }
        }
        RoundingMode::Nearest => {
            let floored = value.floor();
            let remainder = value - floored;
            if remainder >= 0.5 { floored + 1.0 } else { floored }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 14] = [
        0.0, 0.2, 0.5, 0.7, 1.0, 2.49, 2.5, 7.99, -0.2, -0.5, -0.7, -2.5, -2.6, -7.01,
    ];

    fn same(a: f64, b: f64) -> bool {
        (a - b).abs() < f64::EPSILON
    }

    #[test]
    fn up_rounds_away_from_zero() {
        for value in SAMPLES {
            let expected = if value >= 0.0 { value.ceil() } else { value.floor() };
            assert!(same(round(value, RoundingMode::Up), expected), "up({value})");
        }
        assert!(same(round(2.1, RoundingMode::Up), 3.0));
        assert!(same(round(-2.1, RoundingMode::Up), -3.0));
    }

    #[test]
    fn down_rounds_toward_zero() {
        for value in SAMPLES {
            let expected = if value >= 0.0 { value.floor() } else { value.ceil() };
            assert!(same(round(value, RoundingMode::Down), expected), "down({value})");
        }
        assert!(same(round(2.9, RoundingMode::Down), 2.0));
        assert!(same(round(-2.9, RoundingMode::Down), -2.0));
    }

    #[test]
    fn nearest_is_floor_based() {
        for value in SAMPLES {
            let floored = value.floor();
            let bump = if value - floored >= 0.5 { 1.0 } else { 0.0 };
            assert!(same(round(value, RoundingMode::Nearest), floored + bump), "nearest({value})");
        }
    }

    #[test]
    fn nearest_keeps_negative_half_behaviour() {
        // floor(-2.5) = -3, remainder 0.5 -> -2
        assert!(same(round(-2.5, RoundingMode::Nearest), -2.0));
        // floor(-2.6) = -3, remainder 0.4 -> -3
        assert!(same(round(-2.6, RoundingMode::Nearest), -3.0));
        assert!(same(round(2.5, RoundingMode::Nearest), 3.0));
        assert!(same(round(2.4, RoundingMode::Nearest), 2.0));
    }

    #[test]
    fn whole_numbers_are_unchanged() {
        for mode in [RoundingMode::Up, RoundingMode::Down, RoundingMode::Nearest] {
            assert!(same(round(4.0, mode), 4.0));
            assert!(same(round(-4.0, mode), -4.0));
        }
    }
}
