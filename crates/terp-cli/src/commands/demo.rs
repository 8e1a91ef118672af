//! Fixture data for the CLI demo tenant.
//!
//! There is no ingestion command (spec's Non-goal: no HTTP surface,
//! §1) so each invocation seeds the same small `(employee, day plan,
//! booking types)` baseline a real deployment would load from its own
//! tenant configuration.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use terp_core::domain::{
    AssignmentSource, Booking, BookingCategory, BookingSource, BookingType, DayPlan, Direction,
    EmployeeDayPlan, HolidayCreditRule, RoundingPolicy, Tolerance,
};

pub const TENANT_ID: &str = "demo";
pub const DAY_PLAN_ID: &str = "standard-8h";

pub fn booking_types() -> HashMap<String, BookingType> {
    let mut m = HashMap::new();
    m.insert(
        "come".to_string(),
        BookingType {
            id: "come".into(),
            tenant_id: TENANT_ID.into(),
            direction: Direction::In,
            category: BookingCategory::Work,
            display_name: "Arrival".into(),
        },
    );
    m.insert(
        "go".to_string(),
        BookingType {
            id: "go".into(),
            tenant_id: TENANT_ID.into(),
            direction: Direction::Out,
            category: BookingCategory::Work,
            display_name: "Departure".into(),
        },
    );
    m
}

pub fn day_plan() -> DayPlan {
    DayPlan {
        id: DAY_PLAN_ID.into(),
        tenant_id: TENANT_ID.into(),
        name: "Standard 8h".into(),
        come_from: Some(420),
        come_to: Some(540),
        go_from: Some(960),
        go_to: Some(1080),
        core_start: None,
        core_end: None,
        regular_hours: 480,
        tolerance: Tolerance { come_plus: 5, come_minus: 0, go_plus: 0, go_minus: 5 },
        come_rounding: RoundingPolicy::identity(),
        go_rounding: RoundingPolicy::identity(),
        break_rules: vec![],
        bonus_rules: vec![],
        min_work_time: None,
        max_net_work_time: None,
        flextime_cap_positive: None,
        flextime_cap_negative: None,
        holiday_credit: HolidayCreditRule::default(),
    }
}

pub fn assignment(employee_id: &str, date: NaiveDate) -> EmployeeDayPlan {
    EmployeeDayPlan {
        employee_id: employee_id.to_string(),
        date,
        day_plan_id: Some(DAY_PLAN_ID.to_string()),
        source: AssignmentSource::Tariff,
    }
}

/// A plausible 08:00-16:30 work day, used when no `--bookings-json` is given.
pub fn default_bookings(employee_id: &str, date: NaiveDate) -> Vec<Booking> {
    let make = |id: &str, booking_type_id: &str, minutes: u16| Booking {
        id: id.to_string(),
        tenant_id: TENANT_ID.to_string(),
        employee_id: employee_id.to_string(),
        date,
        raw_time: minutes,
        edited_time: minutes,
        calculated_time: None,
        booking_type_id: booking_type_id.to_string(),
        pair_id: None,
        source: BookingSource::Web,
        reason_code: None,
        is_auto_generated: false,
        original_booking_id: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    vec![make("demo-come", "come", 480), make("demo-go", "go", 990)]
}
