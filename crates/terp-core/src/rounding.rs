//! Rounding and tolerance applied to work bookings before pairing
//! (spec.md §4.2).

use crate::domain::{Direction, RoundingPolicy, RoundingType, Tolerance};

/// Snap `actual` to a plan edge when it falls within the grace window
/// around it. `plus`/`minus` describe how far past/before the edge still
/// counts as "on time" (spec.md §4.2).
fn apply_tolerance(actual: u16, edge: Option<u16>, minus: u16, plus: u16) -> u16 {
    let Some(edge) = edge else { return actual };
    let lower = edge.saturating_sub(minus);
    let upper = edge.saturating_add(plus);
    if (lower..=upper).contains(&actual) { edge } else { actual }
}

/// `type=up → ceil`, `down → floor`, `nearest → ties round up`, `none`
/// (or `interval<=0`) is identity (spec.md §4.2).
fn apply_rounding(t: u16, policy: RoundingPolicy) -> u16 {
    if policy.interval <= 0 || policy.kind == RoundingType::None {
        return t;
    }
    let interval = policy.interval as i32;
    let t = t as i32;
    let rounded = match policy.kind {
        RoundingType::None => t,
        RoundingType::Up => ((t + interval - 1) / interval) * interval,
        RoundingType::Down => (t / interval) * interval,
        RoundingType::Nearest => {
            let rem = t % interval;
            if rem * 2 >= interval { t - rem + interval } else { t - rem }
        }
    };
    rounded.clamp(0, crate::time::MAX_POINT as i32) as u16
}

/// Apply tolerance then rounding to one work booking's edited time,
/// producing `calculatedTime` (spec.md §4.2). `direction` selects which
/// plan edge and rounding policy govern this booking.
pub fn calculate_time(
    edited_time: u16,
    direction: Direction,
    come_to: Option<u16>,
    go_from: Option<u16>,
    tolerance: Tolerance,
    come_rounding: RoundingPolicy,
    go_rounding: RoundingPolicy,
) -> u16 {
    let (snapped, policy) = match direction {
        Direction::In => {
            (apply_tolerance(edited_time, come_to, tolerance.come_minus, tolerance.come_plus), come_rounding)
        }
        Direction::Out => {
            (apply_tolerance(edited_time, go_from, tolerance.go_minus, tolerance.go_plus), go_rounding)
        }
    };
    apply_rounding(snapped, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_snaps_within_window() {
        assert_eq!(apply_tolerance(483, Some(480), 0, 5), 480);
        assert_eq!(apply_tolerance(486, Some(480), 0, 5), 486);
        assert_eq!(apply_tolerance(1017, Some(1020), 5, 0), 1020);
    }

    #[test]
    fn tolerance_is_noop_without_edge() {
        assert_eq!(apply_tolerance(483, None, 0, 5), 483);
    }

    #[test]
    fn rounding_modes() {
        let up = RoundingPolicy { kind: RoundingType::Up, interval: 5 };
        let down = RoundingPolicy { kind: RoundingType::Down, interval: 5 };
        let nearest = RoundingPolicy { kind: RoundingType::Nearest, interval: 5 };
        assert_eq!(apply_rounding(481, up), 485);
        assert_eq!(apply_rounding(484, down), 480);
        assert_eq!(apply_rounding(482, nearest), 480);
        assert_eq!(apply_rounding(483, nearest), 485);
    }

    #[test]
    fn identity_rounding_and_zero_interval_are_noop() {
        assert_eq!(apply_rounding(483, RoundingPolicy::identity()), 483);
        assert_eq!(apply_rounding(483, RoundingPolicy { kind: RoundingType::Up, interval: 0 }), 483);
    }

    #[test]
    fn spec_example_tolerance_plus_rounding() {
        let tolerance = Tolerance { come_plus: 5, come_minus: 0, go_plus: 0, go_minus: 5 };
        let nearest5 = RoundingPolicy { kind: RoundingType::Nearest, interval: 5 };
        let come = calculate_time(483, Direction::In, Some(480), Some(1020), tolerance, nearest5, nearest5);
        let go = calculate_time(1017, Direction::Out, Some(480), Some(1020), tolerance, nearest5, nearest5);
        assert_eq!(come, 480);
        assert_eq!(go, 1020);
    }
}
