//! The computed per-day result (spec.md §3, §7).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable uppercase error identifiers that set `DailyValue::status = Error`
/// (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingCome,
    MissingGo,
    UnpairedBooking,
    EarlyCome,
    LateCome,
    EarlyGo,
    LateGo,
    MissedCoreStart,
    MissedCoreEnd,
    BelowMinWorkTime,
    NoBookings,
    InvalidTime,
    DuplicateInTime,
    NoMatchingShift,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingCome => "MISSING_COME",
            ErrorCode::MissingGo => "MISSING_GO",
            ErrorCode::UnpairedBooking => "UNPAIRED_BOOKING",
            ErrorCode::EarlyCome => "EARLY_COME",
            ErrorCode::LateCome => "LATE_COME",
            ErrorCode::EarlyGo => "EARLY_GO",
            ErrorCode::LateGo => "LATE_GO",
            ErrorCode::MissedCoreStart => "MISSED_CORE_START",
            ErrorCode::MissedCoreEnd => "MISSED_CORE_END",
            ErrorCode::BelowMinWorkTime => "BELOW_MIN_WORK_TIME",
            ErrorCode::NoBookings => "NO_BOOKINGS",
            ErrorCode::InvalidTime => "INVALID_TIME",
            ErrorCode::DuplicateInTime => "DUPLICATE_IN_TIME",
            ErrorCode::NoMatchingShift => "NO_MATCHING_SHIFT",
        }
    }
}

/// Non-blocking warning identifiers (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Warning {
    CrossMidnight,
    MaxTimeReached,
    ManualBreak,
    AutoBreakApplied,
    NoBreakRecorded,
    ShortBreak,
    MonthlyCap,
    FlextimeCapped,
    BelowThreshold,
    NoCarryover,
    AbsenceOnHoliday,
}

impl Warning {
    pub fn as_str(self) -> &'static str {
        match self {
            Warning::CrossMidnight => "CROSS_MIDNIGHT",
            Warning::MaxTimeReached => "MAX_TIME_REACHED",
            Warning::ManualBreak => "MANUAL_BREAK",
            Warning::AutoBreakApplied => "AUTO_BREAK_APPLIED",
            Warning::NoBreakRecorded => "NO_BREAK_RECORDED",
            Warning::ShortBreak => "SHORT_BREAK",
            Warning::MonthlyCap => "MONTHLY_CAP",
            Warning::FlextimeCapped => "FLEXTIME_CAPPED",
            Warning::BelowThreshold => "BELOW_THRESHOLD",
            Warning::NoCarryover => "NO_CARRYOVER",
            Warning::AbsenceOnHoliday => "ABSENCE_ON_HOLIDAY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyStatus {
    Calculated,
    Approved,
    Error,
}

/// The computed per-day result (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValue {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: DailyStatus,
    pub target_time: i32,
    pub gross_time: i32,
    pub net_time: i32,
    pub break_time: i32,
    pub overtime: i32,
    pub undertime: i32,
    pub first_come: Option<u16>,
    pub last_go: Option<u16>,
    pub booking_count: u32,
    pub error_codes: Vec<ErrorCode>,
    pub warnings: Vec<Warning>,
    pub surcharges: BTreeMap<String, i32>,
    pub calculated_at: DateTime<Utc>,
}

impl DailyValue {
    pub fn has_error(&self) -> bool {
        self.status == DailyStatus::Error
    }

    /// Derive `status` from `error_codes`, per spec.md §4.6 step 13.
    pub fn finalize_status(&mut self) {
        self.status =
            if self.error_codes.is_empty() { DailyStatus::Calculated } else { DailyStatus::Error };
    }

    /// Check the universally-quantified invariants of spec.md §8.
    pub fn check_invariants(&self) -> bool {
        self.net_time >= 0
            && self.overtime >= 0
            && self.undertime >= 0
            && self.overtime * self.undertime == 0
    }

    /// `calculated -> approved`, one-way once taken except via [`reject`].
    /// Refuses when `error_codes` is non-empty (spec.md §7: a day with
    /// open errors cannot be approved).
    ///
    /// [`reject`]: DailyValue::reject
    pub fn approve(&mut self) -> bool {
        if self.status != DailyStatus::Calculated || !self.error_codes.is_empty() {
            return false;
        }
        self.status = DailyStatus::Approved;
        true
    }

    /// `approved -> calculated`, the admin override back to the
    /// recalculable state (spec.md §7).
    pub fn reject(&mut self) -> bool {
        if self.status != DailyStatus::Approved {
            return false;
        }
        self.status = DailyStatus::Calculated;
        true
    }

    /// Equality for idempotence checks, ignoring `calculated_at` (spec.md §4.8, §8).
    pub fn same_value_as(&self, other: &DailyValue) -> bool {
        self.employee_id == other.employee_id
            && self.date == other.date
            && self.status == other.status
            && self.target_time == other.target_time
            && self.gross_time == other.gross_time
            && self.net_time == other.net_time
            && self.break_time == other.break_time
            && self.overtime == other.overtime
            && self.undertime == other.undertime
            && self.first_come == other.first_come
            && self.last_go == other.last_go
            && self.booking_count == other.booking_count
            && self.error_codes == other.error_codes
            && self.warnings == other.warnings
            && self.surcharges == other.surcharges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DailyValue {
        DailyValue {
            employee_id: "e1".into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            status: DailyStatus::Calculated,
            target_time: 480,
            gross_time: 540,
            net_time: 540,
            break_time: 0,
            overtime: 60,
            undertime: 0,
            first_come: Some(480),
            last_go: Some(1020),
            booking_count: 2,
            error_codes: vec![],
            warnings: vec![],
            surcharges: BTreeMap::new(),
            calculated_at: Utc::now(),
        }
    }

    #[test]
    fn error_codes_stringify_stably() {
        assert_eq!(ErrorCode::MissingGo.as_str(), "MISSING_GO");
        assert_eq!(Warning::CrossMidnight.as_str(), "CROSS_MIDNIGHT");
    }

    #[test]
    fn finalize_status_reflects_error_codes() {
        let mut dv = sample();
        dv.finalize_status();
        assert_eq!(dv.status, DailyStatus::Calculated);

        dv.error_codes.push(ErrorCode::MissingGo);
        dv.finalize_status();
        assert_eq!(dv.status, DailyStatus::Error);
        assert!(dv.has_error());
    }

    #[test]
    fn invariants_reject_simultaneous_over_and_undertime() {
        let mut dv = sample();
        assert!(dv.check_invariants());
        dv.undertime = 10;
        assert!(!dv.check_invariants());
    }

    #[test]
    fn approve_refuses_open_errors() {
        let mut dv = sample();
        dv.error_codes.push(ErrorCode::MissingGo);
        dv.finalize_status();
        assert!(!dv.approve());
        assert_eq!(dv.status, DailyStatus::Error);
    }

    #[test]
    fn approve_then_reject_round_trips() {
        let mut dv = sample();
        assert!(dv.approve());
        assert_eq!(dv.status, DailyStatus::Approved);
        assert!(dv.reject());
        assert_eq!(dv.status, DailyStatus::Calculated);
    }

    #[test]
    fn reject_refuses_non_approved_source() {
        let mut dv = sample();
        assert!(!dv.reject());
        assert_eq!(dv.status, DailyStatus::Calculated);
    }

    #[test]
    fn same_value_as_ignores_calculated_at() {
        let a = sample();
        let mut b = sample();
        b.calculated_at = a.calculated_at + chrono::Duration::seconds(5);
        assert!(a.same_value_as(&b));
        b.net_time += 1;
        assert!(!a.same_value_as(&b));
    }
}
