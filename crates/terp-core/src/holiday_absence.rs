//! Holiday / absence credit resolution (spec.md §4.5).
//!
//! The decision table is evaluated top-down, first match wins, the same
//! shape as the teacher's `TaskState::can_transition_to` match arms.

use crate::domain::{AbsenceDay, AbsenceStatus, AbsenceType, Holiday, HolidayCreditRule, Warning};

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Off-day or no schedule assignment: no target, no net.
    OffDay,
    /// Credited by an approved, priority-overriding absence.
    AbsenceCredit { net_time: i32, account_code: String },
    /// Credited by the holiday's category factor against `regular_hours`.
    HolidayCredit { net_time: i32, warnings: Vec<Warning> },
    /// No holiday/absence override: proceed to the ordinary daily
    /// calculation (spec.md §4.6).
    Normal,
}

/// `regular_hours` is the assigned plan's target for the day; absent for
/// an off-day or missing assignment. `absence`, when present, must
/// already be filtered to non-cancelled/non-rejected records upstream
/// per the repository contract (spec.md §6), except for the
/// priority-0-coexistence check which inspects liveness itself.
pub fn resolve(
    is_off_day: bool,
    regular_hours: Option<u16>,
    holiday: Option<&Holiday>,
    absence: Option<(&AbsenceDay, &AbsenceType)>,
    coexisting_priority_zero_absence: bool,
    holiday_credit: HolidayCreditRule,
    has_bookings: bool,
) -> Resolution {
    if is_off_day {
        return Resolution::OffDay;
    }

    let approved_overriding = absence.filter(|(day, kind)| {
        day.status == AbsenceStatus::Approved
            && day.is_live()
            && (holiday.is_none() || kind.priority > 0)
    });

    if !has_bookings {
        if let Some((day, kind)) = approved_overriding {
            let target = regular_hours.unwrap_or(0) as f64;
            let net = target * kind.portion * day.duration.factor();
            return Resolution::AbsenceCredit { net_time: net.round() as i32, account_code: kind.code.clone() };
        }

        if let Some(h) = holiday {
            let factor = holiday_credit.factor_for(h.category);
            let net = regular_hours.unwrap_or(0) as f64 * factor;
            let mut warnings = Vec::new();
            if coexisting_priority_zero_absence {
                warnings.push(Warning::AbsenceOnHoliday);
            }
            return Resolution::HolidayCredit { net_time: net.round() as i32, warnings };
        }
    }

    Resolution::Normal
}
