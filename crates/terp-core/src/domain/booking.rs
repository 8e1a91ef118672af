//! Booking and booking-type records (spec.md §3).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which side of a clock event a booking represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

/// What the booking counts toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingCategory {
    Work,
    Break,
}

/// Where a booking originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Web,
    Terminal,
    Api,
    Import,
    Correction,
    Derived,
}

/// Categorical descriptor for a booking: direction + category + display.
/// Immutable within a tenant per ingest cycle (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingType {
    pub id: String,
    pub tenant_id: String,
    pub direction: Direction,
    pub category: BookingCategory,
    pub display_name: String,
}

/// A single clock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub tenant_id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    /// Time as observed, minutes from midnight, `0..=1439`.
    pub raw_time: u16,
    /// Time after any human correction, minutes from midnight, `0..=1439`.
    pub edited_time: u16,
    /// Time after rounding/tolerance (spec.md §4.2); set by the daily engine,
    /// never persisted back onto `edited_time`.
    pub calculated_time: Option<u16>,
    pub booking_type_id: String,
    pub pair_id: Option<String>,
    pub source: BookingSource,
    pub reason_code: Option<String>,
    pub is_auto_generated: bool,
    pub original_booking_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Validate the invariants of spec.md §3: `edited ∈ [0,1439]`; if
    /// `source == Derived` then `original_booking_id` is set and
    /// `is_auto_generated` is true.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.edited_time > crate::time::MAX_POINT {
            return Err(ValidationError::MinuteOutOfRange {
                value: self.edited_time as i32,
                min: 0,
                max: crate::time::MAX_POINT,
            });
        }
        if self.source == BookingSource::Derived
            && (self.original_booking_id.is_none() || !self.is_auto_generated)
        {
            return Err(ValidationError::InvalidValue {
                field: "original_booking_id".to_string(),
                message: "derived bookings must set original_booking_id and is_auto_generated"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// The time value used by pairing/rounding: `calculated_time` if set
    /// (post rounding/tolerance), otherwise `edited_time`.
    pub fn effective_time(&self) -> u16 {
        self.calculated_time.unwrap_or(self.edited_time)
    }
}

/// Reference time basis for an auto-generated correction booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTime {
    PlanStart,
    PlanEnd,
    BookingTime,
}

/// A named correction reason that can synthesize a derived booking
/// (spec.md §3). `reference_time` and `offset_minutes` are both set or
/// both absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReason {
    pub code: String,
    pub label: String,
    pub booking_type_id: String,
    pub reference_time: Option<ReferenceTime>,
    pub offset_minutes: Option<i32>,
    pub adjustment_booking_type_id: Option<String>,
}

impl BookingReason {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reference_time.is_some() != self.offset_minutes.is_some() {
            return Err(ValidationError::InvalidValue {
                field: "reference_time/offset_minutes".to_string(),
                message: "must both be set or both be absent".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_booking(source: BookingSource, original: Option<&str>, auto: bool) -> Booking {
        Booking {
            id: "b1".into(),
            tenant_id: "t1".into(),
            employee_id: "e1".into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            raw_time: 480,
            edited_time: 480,
            calculated_time: None,
            booking_type_id: "come".into(),
            pair_id: None,
            source,
            reason_code: None,
            is_auto_generated: auto,
            original_booking_id: original.map(String::from),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn derived_booking_requires_original_and_flag() {
        let ok = sample_booking(BookingSource::Derived, Some("orig"), true);
        assert!(ok.validate().is_ok());

        let missing_original = sample_booking(BookingSource::Derived, None, true);
        assert!(missing_original.validate().is_err());

        let missing_flag = sample_booking(BookingSource::Derived, Some("orig"), false);
        assert!(missing_flag.validate().is_err());
    }

    #[test]
    fn non_derived_booking_has_no_constraint() {
        let b = sample_booking(BookingSource::Web, None, false);
        assert!(b.validate().is_ok());
    }

    #[test]
    fn effective_time_prefers_calculated() {
        let mut b = sample_booking(BookingSource::Web, None, false);
        assert_eq!(b.effective_time(), 480);
        b.calculated_time = Some(485);
        assert_eq!(b.effective_time(), 485);
    }

    #[test]
    fn booking_reason_requires_both_or_neither() {
        let mut r = BookingReason {
            code: "late".into(),
            label: "Late arrival".into(),
            booking_type_id: "come".into(),
            reference_time: Some(ReferenceTime::PlanStart),
            offset_minutes: None,
            adjustment_booking_type_id: None,
        };
        assert!(r.validate().is_err());
        r.offset_minutes = Some(5);
        assert!(r.validate().is_ok());
        r.reference_time = None;
        r.offset_minutes = None;
        assert!(r.validate().is_ok());
    }
}
