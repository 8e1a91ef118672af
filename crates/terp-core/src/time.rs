//! Minutes-of-day arithmetic, `HH:MM` parsing, and cross-midnight
//! normalization (spec.md §2 `TimeUtil`, §3).
//!
//! All time-of-day values in this crate are integer minutes from
//! midnight. Points live in `0..=1439`; interval ends (which describe
//! `[from, to)` windows) may additionally take the value `1440` to mean
//! "end of day".

use std::fmt;

use crate::error::ValidationError;

/// Inclusive upper bound for a minute-of-day *point* (23:59).
pub const MAX_POINT: u16 = 1439;
/// Inclusive upper bound for a minute-of-day *interval end* (24:00).
pub const MAX_INTERVAL_END: u16 = 1440;

/// A validated minute-of-day point in `0..=1439`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    /// Construct from a raw minute count, rejecting anything outside
    /// `0..=1439` (spec.md §8: `∀ Booking b stored : 0 ≤ b.editedTime ≤ 1439`).
    pub fn new(minutes: i32) -> Result<Self, ValidationError> {
        if !(0..=MAX_POINT as i32).contains(&minutes) {
            return Err(ValidationError::MinuteOutOfRange {
                value: minutes,
                min: 0,
                max: MAX_POINT,
            });
        }
        Ok(Self(minutes as u16))
    }

    /// Parse an `HH:MM` string into a minute-of-day point.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let (h, m) = split_hhmm(s)?;
        Self::new(h * 60 + m)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Format back to `HH:MM`.
    pub fn format(self) -> String {
        format!("{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn split_hhmm(s: &str) -> Result<(i32, i32), ValidationError> {
    let mut parts = s.splitn(2, ':');
    let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
        return Err(ValidationError::InvalidValue {
            field: "time".to_string(),
            message: format!("expected HH:MM, got '{s}'"),
        });
    };
    let to_int = |p: &str, field: &str| {
        p.parse::<i32>().map_err(|_| ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("'{p}' is not a number"),
        })
    };
    let h = to_int(h, "hour")?;
    let m = to_int(m, "minute")?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return Err(ValidationError::InvalidValue {
            field: "time".to_string(),
            message: format!("'{s}' is not a valid time of day"),
        });
    }
    Ok((h, m))
}

/// A half-open `[from, to)` window over minute-of-day, used by bonus/
/// surcharge configs and plan windows. `to` may be `1440` (end of day)
/// but never crosses midnight — see spec.md §4.3's midnight invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MinuteWindow {
    pub from: u16,
    pub to: u16,
}

impl MinuteWindow {
    /// Construct a window, rejecting `from >= to` or either bound out of
    /// range, per spec.md §8: `0 ≤ timeFrom < timeTo ≤ 1440`.
    pub fn new(from: u16, to: u16) -> Result<Self, ValidationError> {
        if to > MAX_INTERVAL_END {
            return Err(ValidationError::MinuteOutOfRange {
                value: to as i32,
                min: 0,
                max: MAX_INTERVAL_END,
            });
        }
        if from >= to {
            return Err(ValidationError::SurchargeCrossesMidnight { time_from: from, time_to: to });
        }
        Ok(Self { from, to })
    }

    pub fn duration_minutes(&self) -> u16 {
        self.to - self.from
    }

    /// Overlap, in minutes, between this window and a `[start, end)` period.
    /// `end` may legitimately exceed 1440 for a cross-midnight work pair
    /// whose duration was computed with `out += 1440` (spec.md §4.1);
    /// callers normalize before calling this for the *next* day's window.
    pub fn overlap_minutes(&self, start: i32, end: i32) -> i32 {
        let lo = start.max(self.from as i32);
        let hi = end.min(self.to as i32);
        (hi - lo).max(0)
    }
}

/// A concrete `[start, end)` work or break period in minute-of-day space,
/// where `end` may be `>= 1440` to represent a cross-midnight pair's
/// duration (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: i32,
    pub end: i32,
}

impl TimePeriod {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i32 {
        (self.end - self.start).max(0)
    }
}

/// Adjust an out-time for cross-midnight pairing: if `out < in_time`, the
/// booking rolled past midnight, so add a full day for duration purposes
/// only (spec.md §4.1). Returns `(adjusted_out, crossed_midnight)`.
pub fn normalize_cross_midnight(in_time: u16, out_time: u16) -> (i32, bool) {
    if (out_time as i32) < (in_time as i32) {
        (out_time as i32 + 1440, true)
    } else {
        (out_time as i32, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hhmm() {
        assert_eq!(MinuteOfDay::parse("08:00").unwrap().value(), 480);
        assert_eq!(MinuteOfDay::parse("23:59").unwrap().value(), 1439);
        assert_eq!(MinuteOfDay::parse("00:00").unwrap().value(), 0);
    }

    #[test]
    fn rejects_bad_hhmm() {
        assert!(MinuteOfDay::parse("24:00").is_err());
        assert!(MinuteOfDay::parse("08:60").is_err());
        assert!(MinuteOfDay::parse("nope").is_err());
    }

    #[test]
    fn formats_round_trip() {
        let m = MinuteOfDay::parse("17:05").unwrap();
        assert_eq!(m.format(), "17:05");
    }

    #[test]
    fn minute_of_day_range_check() {
        assert!(MinuteOfDay::new(-1).is_err());
        assert!(MinuteOfDay::new(1440).is_err());
        assert!(MinuteOfDay::new(1439).is_ok());
    }

    #[test]
    fn window_rejects_midnight_crossing() {
        assert!(MinuteWindow::new(1320, 360).is_err()); // 22:00 -> 06:00, not split
        assert!(MinuteWindow::new(1320, 1440).is_ok()); // 22:00 -> 24:00
        assert!(MinuteWindow::new(0, 360).is_ok()); // 00:00 -> 06:00
    }

    #[test]
    fn window_overlap() {
        let w = MinuteWindow::new(1320, 1440).unwrap(); // 22:00-24:00
        assert_eq!(w.overlap_minutes(1200, 1380), 60); // 20:00-23:00 -> 60 min overlap
        assert_eq!(w.overlap_minutes(0, 1320), 0);
    }

    #[test]
    fn cross_midnight_normalizes() {
        let (adj, crossed) = normalize_cross_midnight(1320, 120); // 22:00 in, 02:00 out
        assert_eq!(adj, 1440 + 120);
        assert!(crossed);

        let (adj, crossed) = normalize_cross_midnight(480, 1020); // 08:00 in, 17:00 out
        assert_eq!(adj, 1020);
        assert!(!crossed);
    }
}
