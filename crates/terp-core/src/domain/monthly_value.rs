//! Monthly aggregate (spec.md §3, §4.7).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::daily_value::Warning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyValue {
    pub employee_id: String,
    pub year: i32,
    pub month: u32,
    pub net_time: i32,
    pub target_time: i32,
    pub overtime: i32,
    pub undertime: i32,
    /// `Σovertime − Σundertime` for the month, before caps/carryover.
    pub month_balance: i32,
    /// Opening balance plus this month's (capped) balance; carries into
    /// next month per the policy in `FlextimeCarryoverPolicy`.
    pub flextime_balance: i32,
    pub account_totals: BTreeMap<String, i32>,
    pub warnings: Vec<Warning>,
    pub calculated_at: DateTime<Utc>,
}

impl MonthlyValue {
    pub fn same_value_as(&self, other: &MonthlyValue) -> bool {
        self.employee_id == other.employee_id
            && self.year == other.year
            && self.month == other.month
            && self.net_time == other.net_time
            && self.target_time == other.target_time
            && self.overtime == other.overtime
            && self.undertime == other.undertime
            && self.month_balance == other.month_balance
            && self.flextime_balance == other.flextime_balance
            && self.account_totals == other.account_totals
            && self.warnings == other.warnings
    }
}

/// How a flextime carry-in is treated at month-boundary (Open Question
/// (b), SPEC_FULL.md §2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlextimeCarryoverPolicy {
    Unlimited,
    ExpireAfterMonths(u32),
    CapAt(i32),
}
