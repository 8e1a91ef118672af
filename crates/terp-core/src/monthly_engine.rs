//! Monthly aggregation, flextime caps and carryover (spec.md §4.7).
//!
//! Grounded on the accumulate-then-clamp shape of the teacher's removed
//! `stats::break_adherence` aggregator.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::domain::{DailyValue, FlextimeCarryoverPolicy, MonthlyValue, Warning};

/// Sum daily values into one monthly aggregate, apply the flextime cap,
/// carry the (possibly expired) opening balance forward, then apply the
/// per-account `monthlyCap`/`belowThreshold` credit rules (spec.md §4.7
/// steps 1-5). `days` must all belong to the same `(employee, year,
/// month)`.
#[allow(clippy::too_many_arguments)]
pub fn calculate_month(
    employee_id: &str,
    year: i32,
    month: u32,
    days: &[DailyValue],
    opening_balance: i32,
    opening_balance_age_months: u32,
    flextime_cap_positive: Option<i32>,
    flextime_cap_negative: Option<i32>,
    carryover_policy: FlextimeCarryoverPolicy,
    monthly_credit_cap: Option<i32>,
    monthly_credit_threshold: Option<i32>,
) -> MonthlyValue {
    let mut net_time = 0;
    let mut target_time = 0;
    let mut overtime = 0;
    let mut undertime = 0;
    let mut account_totals: BTreeMap<String, i32> = BTreeMap::new();
    let mut warnings = Vec::new();

    for day in days {
        net_time += day.net_time;
        target_time += day.target_time;
        overtime += day.overtime;
        undertime += day.undertime;
        for (account, minutes) in &day.surcharges {
            *account_totals.entry(account.clone()).or_insert(0) += minutes;
        }
    }

    let month_balance = overtime - undertime;

    let (opening_balance, opening_expired) =
        apply_carryover_expiry(opening_balance, opening_balance_age_months, carryover_policy);
    if opening_expired {
        warnings.push(Warning::NoCarryover);
    }

    let mut flextime_balance = opening_balance + month_balance;
    if let Some(cap) = flextime_cap_positive {
        if flextime_balance > cap {
            flextime_balance = cap;
            warnings.push(Warning::FlextimeCapped);
        }
    }
    if let Some(cap) = flextime_cap_negative {
        if flextime_balance < -cap {
            flextime_balance = -cap;
            warnings.push(Warning::FlextimeCapped);
        }
    }

    if let FlextimeCarryoverPolicy::CapAt(cap) = carryover_policy {
        if flextime_balance.abs() > cap {
            flextime_balance = flextime_balance.clamp(-cap, cap);
            if !warnings.contains(&Warning::FlextimeCapped) {
                warnings.push(Warning::FlextimeCapped);
            }
        }
    }

    if let Some(cap) = monthly_credit_cap {
        for total in account_totals.values_mut() {
            if *total > cap {
                *total = cap;
                if !warnings.contains(&Warning::MonthlyCap) {
                    warnings.push(Warning::MonthlyCap);
                }
            }
        }
    }
    if let Some(threshold) = monthly_credit_threshold {
        for total in account_totals.values_mut() {
            if *total > 0 && *total < threshold {
                *total = 0;
                if !warnings.contains(&Warning::BelowThreshold) {
                    warnings.push(Warning::BelowThreshold);
                }
            }
        }
    }

    MonthlyValue {
        employee_id: employee_id.to_string(),
        year,
        month,
        net_time,
        target_time,
        overtime,
        undertime,
        month_balance,
        flextime_balance,
        account_totals,
        warnings,
        calculated_at: Utc::now(),
    }
}

/// Carryover expiry under [`FlextimeCarryoverPolicy::ExpireAfterMonths`]:
/// an opening balance older than the configured window is forfeited
/// rather than carried forward (Open Question (b), SPEC_FULL.md §2).
pub fn apply_carryover_expiry(
    opening_balance: i32,
    months_since_earned: u32,
    policy: FlextimeCarryoverPolicy,
) -> (i32, bool) {
    match policy {
        FlextimeCarryoverPolicy::ExpireAfterMonths(limit) if months_since_earned >= limit => (0, true),
        _ => (opening_balance, false),
    }
}
