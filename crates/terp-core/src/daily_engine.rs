//! Daily engine: orchestrates pairing, rounding, break, surcharge and
//! holiday/absence resolution into one `DailyValue` (spec.md §4.6).
//!
//! Grounded on the stage pipeline shape of the teacher's
//! `scheduler::AutoScheduler::generate_schedule`: parse boundaries, build
//! inputs, run the gap/assignment pass, assemble the output — never
//! aborting partway through.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};

use crate::break_engine::{apply_net_clamp, calculate_break};
use crate::domain::{
    AbsenceDay, AbsenceType, Booking, BookingCategory, BookingType, DailyStatus, DailyValue,
    DayPlan, Direction, EmployeeDayPlan, ErrorCode, Holiday, Warning,
};
use crate::holiday_absence::{self, Resolution};
use crate::pairing::{pair_bookings, PairingWarning};
use crate::rounding::calculate_time;
use crate::surcharge::calculate_surcharges;
use crate::time::TimePeriod;

/// Everything the daily engine needs for one `(employee, date)`, preloaded
/// as a single immutable snapshot per spec.md §9 ("do not fetch children
/// lazily inside the hot loop").
pub struct DailyInput<'a> {
    pub employee_id: &'a str,
    pub date: NaiveDate,
    pub bookings: &'a [Booking],
    pub booking_types: &'a HashMap<String, BookingType>,
    pub assignment: Option<&'a EmployeeDayPlan>,
    pub plan: Option<&'a DayPlan>,
    pub holiday: Option<&'a Holiday>,
    pub absence: Option<(&'a AbsenceDay, &'a AbsenceType)>,
    pub coexisting_priority_zero_absence: bool,
}

/// Compute the `DailyValue` for one `(employee, date)` (spec.md §4.6).
/// Never fails: invalid inputs surface as `error_codes` on the result.
pub fn calculate_day(input: &DailyInput<'_>) -> DailyValue {
    let mut error_codes = Vec::new();
    let mut warnings = Vec::new();

    let is_off_day = input.assignment.map_or(true, |a| a.is_explicit_off_day());
    let regular_hours = input.plan.map(|p| p.regular_hours);

    let resolution = holiday_absence::resolve(
        is_off_day,
        regular_hours,
        input.holiday,
        input.absence,
        input.coexisting_priority_zero_absence,
        input.plan.map(|p| p.holiday_credit).unwrap_or_default(),
        !input.bookings.is_empty(),
    );

    match resolution {
        Resolution::OffDay => {
            return finish(input, 0, 0, 0, 0, 0, 0, None, None, 0, error_codes, warnings, BTreeMap::new());
        }
        Resolution::AbsenceCredit { net_time, .. } => {
            let target = regular_hours.unwrap_or(0) as i32;
            return finish(
                input,
                target,
                net_time,
                net_time,
                0,
                (net_time - target).max(0),
                (target - net_time).max(0),
                None,
                None,
                0,
                error_codes,
                warnings,
                BTreeMap::new(),
            );
        }
        Resolution::HolidayCredit { net_time, warnings: holiday_warnings } => {
            warnings.extend(holiday_warnings);
            let target = regular_hours.unwrap_or(0) as i32;
            return finish(
                input,
                target,
                net_time,
                net_time,
                0,
                (net_time - target).max(0),
                (target - net_time).max(0),
                None,
                None,
                0,
                error_codes,
                warnings,
                BTreeMap::new(),
            );
        }
        Resolution::Normal => {}
    }

    if input.bookings.is_empty() {
        error_codes.push(ErrorCode::NoBookings);
        return finish(
            input,
            regular_hours.unwrap_or(0) as i32,
            0,
            0,
            0,
            0,
            0,
            None,
            None,
            0,
            error_codes,
            warnings,
            BTreeMap::new(),
        );
    }

    // Step 3: rounding/tolerance on work bookings only, producing a
    // working set with calculated_time filled in.
    let mut working: Vec<Booking> = input.bookings.to_vec();
    for booking in &mut working {
        let Some(bt) = input.booking_types.get(&booking.booking_type_id) else { continue };
        if bt.category != BookingCategory::Work {
            continue;
        }
        let calculated = calculate_time(
            booking.edited_time,
            bt.direction,
            input.plan.and_then(|p| p.come_to),
            input.plan.and_then(|p| p.go_from),
            input.plan.map(|p| p.tolerance).unwrap_or_default(),
            input.plan.map(|p| p.come_rounding).unwrap_or(crate::domain::RoundingPolicy::identity()),
            input.plan.map(|p| p.go_rounding).unwrap_or(crate::domain::RoundingPolicy::identity()),
        );
        booking.calculated_time = Some(calculated);
    }

    // Step 4: pairing.
    let pairing = pair_bookings(&working, input.booking_types);
    for _ in &pairing.unpaired_ins {
        error_codes.push(ErrorCode::MissingGo);
    }
    for _ in &pairing.unpaired_outs {
        error_codes.push(ErrorCode::MissingCome);
    }
    if pairing.warnings.contains(&PairingWarning::CrossMidnight) {
        warnings.push(Warning::CrossMidnight);
    }

    let work_pairs: Vec<_> = pairing.pairs_in(BookingCategory::Work).collect();

    // Step 5.
    let first_come = work_pairs.iter().map(|p| p.in_time).min();
    let last_go = work_pairs.iter().map(|p| p.out_time_adjusted).max();

    // Step 6: window/core validation.
    if let Some(plan) = input.plan {
        if let (Some(first), Some(come_from)) = (first_come, plan.come_from) {
            if first < come_from {
                error_codes.push(ErrorCode::EarlyCome);
            }
        }
        if let (Some(first), Some(come_to)) = (first_come, plan.come_to) {
            if first as i32 > come_to as i32 {
                error_codes.push(ErrorCode::LateCome);
            }
        }
        if let (Some(last), Some(go_from)) = (last_go, plan.go_from) {
            if last < go_from as i32 {
                error_codes.push(ErrorCode::EarlyGo);
            }
        }
        if let (Some(last), Some(go_to)) = (last_go, plan.go_to) {
            if last > go_to as i32 {
                error_codes.push(ErrorCode::LateGo);
            }
        }
        if let (Some(core_start), Some(_core_end)) = (plan.core_start, plan.core_end) {
            if first_come.map_or(true, |f| f as i32 > core_start as i32) {
                error_codes.push(ErrorCode::MissedCoreStart);
            }
        }
        if let (Some(_core_start), Some(core_end)) = (plan.core_start, plan.core_end) {
            if last_go.map_or(true, |l| l < core_end as i32) {
                error_codes.push(ErrorCode::MissedCoreEnd);
            }
        }
    }

    // Step 7.
    let gross_time = pairing.total_minutes(BookingCategory::Work);
    let recorded_break_time = pairing.total_minutes(BookingCategory::Break);

    // Step 8.
    let break_rules = input.plan.map(|p| p.break_rules.as_slice()).unwrap_or(&[]);
    let break_result = calculate_break(recorded_break_time, gross_time, break_rules);
    warnings.extend(break_result.warnings);
    let max_net = input.plan.and_then(|p| p.max_net_work_time).map(|v| v as i32);
    let (net_time, capped) = apply_net_clamp(gross_time, break_result.break_time, max_net);
    if capped {
        warnings.push(Warning::MaxTimeReached);
    }

    // Step 9.
    if let Some(min) = input.plan.and_then(|p| p.min_work_time) {
        if net_time < min as i32 {
            error_codes.push(ErrorCode::BelowMinWorkTime);
        }
    }

    // Step 10-11.
    let target_time = regular_hours.unwrap_or(0) as i32;
    let overtime = (net_time - target_time).max(0);
    let undertime = (target_time - net_time).max(0);

    // Step 12: surcharges over work periods.
    let periods: Vec<TimePeriod> =
        work_pairs.iter().map(|p| TimePeriod::new(p.in_time as i32, p.out_time_adjusted)).collect();
    let bonus_rules = input.plan.map(|p| p.bonus_rules.as_slice()).unwrap_or(&[]);
    let is_holiday = input.holiday.is_some();
    let holiday_category = input.holiday.map(|h| h.category);
    let surcharge_result = calculate_surcharges(&periods, bonus_rules, is_holiday, holiday_category);

    finish(
        input,
        target_time,
        gross_time,
        net_time,
        break_result.break_time,
        overtime,
        undertime,
        first_come,
        last_go,
        work_pairs.len() as u32 + pairing.pairs_in(BookingCategory::Break).count() as u32,
        error_codes,
        warnings,
        surcharge_result.as_map(),
    )
}

#[allow(clippy::too_many_arguments)]
fn finish(
    input: &DailyInput<'_>,
    target_time: i32,
    gross_time: i32,
    net_time: i32,
    break_time: i32,
    overtime: i32,
    undertime: i32,
    first_come: Option<u16>,
    last_go: Option<i32>,
    booking_count: u32,
    error_codes: Vec<ErrorCode>,
    warnings: Vec<Warning>,
    surcharges: BTreeMap<String, i32>,
) -> DailyValue {
    let mut dv = DailyValue {
        employee_id: input.employee_id.to_string(),
        date: input.date,
        status: DailyStatus::Calculated,
        target_time,
        gross_time,
        net_time,
        break_time,
        overtime,
        undertime,
        first_come,
        last_go: last_go.map(|v| v.clamp(0, u16::MAX as i32) as u16),
        booking_count,
        error_codes,
        warnings,
        surcharges,
        calculated_at: Utc::now(),
    };
    dv.finalize_status();
    dv
}
