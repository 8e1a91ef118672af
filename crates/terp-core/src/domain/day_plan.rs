//! `DayPlan` and the rule types it carries (spec.md §3).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::MinuteWindow;

/// Rounding behaviour applied per direction (arrival vs departure) by the
/// rounding engine (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingType {
    None,
    Up,
    Down,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    #[serde(rename = "type")]
    pub kind: RoundingType,
    pub interval: i32,
}

impl RoundingPolicy {
    pub const fn identity() -> Self {
        Self { kind: RoundingType::None, interval: 0 }
    }
}

/// Grace window tolerances around a plan edge (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Tolerance {
    pub come_plus: u16,
    pub come_minus: u16,
    pub go_plus: u16,
    pub go_minus: u16,
}

/// A single break-deduction rule (spec.md §3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum BreakRuleType {
    Fixed,
    Variable,
    Minimum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRule {
    pub rule_type: BreakRuleType,
    pub duration_minutes: u16,
    pub after_work_minutes: Option<u16>,
    pub auto_deduct: bool,
    pub is_paid: bool,
    pub window: Option<MinuteWindow>,
}

/// A configured surcharge/bonus window crediting an account (spec.md §3,
/// §4.3). Must satisfy `0 ≤ time_from < time_to ≤ 1440`; this is enforced
/// at construction, never at read time, per spec.md §7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeConfig {
    pub account_id: String,
    pub account_code: String,
    pub window: MinuteWindow,
    pub applies_on_holiday: bool,
    pub applies_on_workday: bool,
    /// Empty means "any holiday category".
    pub holiday_categories: Vec<u8>,
}

impl SurchargeConfig {
    pub fn new(
        account_id: impl Into<String>,
        account_code: impl Into<String>,
        time_from: u16,
        time_to: u16,
        applies_on_holiday: bool,
        applies_on_workday: bool,
        holiday_categories: Vec<u8>,
    ) -> Result<Self, ValidationError> {
        let window = MinuteWindow::new(time_from, time_to)?;
        Ok(Self {
            account_id: account_id.into(),
            account_code: account_code.into(),
            window,
            applies_on_holiday,
            applies_on_workday,
            holiday_categories,
        })
    }

    /// Split an overnight intent (`time_from >= time_to`) into two
    /// midnight-safe configs, preserving identity and flags (spec.md §4.3).
    /// Takes raw bounds rather than `Self` because a `Self` cannot exist
    /// with `from >= to` in the first place.
    pub fn split_overnight(
        account_id: &str,
        account_code: &str,
        time_from: u16,
        time_to: u16,
        applies_on_holiday: bool,
        applies_on_workday: bool,
        holiday_categories: Vec<u8>,
    ) -> Result<(Self, Self), ValidationError> {
        if time_from < time_to {
            return Err(ValidationError::InvalidValue {
                field: "time_from/time_to".to_string(),
                message: "does not cross midnight; construct a single SurchargeConfig instead"
                    .to_string(),
            });
        }
        let first = Self::new(
            account_id,
            account_code,
            time_from,
            crate::time::MAX_INTERVAL_END,
            applies_on_holiday,
            applies_on_workday,
            holiday_categories.clone(),
        )?;
        let second = Self::new(
            account_id,
            account_code,
            0,
            time_to,
            applies_on_holiday,
            applies_on_workday,
            holiday_categories,
        )?;
        Ok((first, second))
    }
}

/// Per-category holiday credit treatment (Open Question (a), see
/// SPEC_FULL.md §2): how much of `regular_hours` a holiday of a given
/// category credits when no absence overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HolidayCreditRule {
    pub category_1_factor: f64,
    pub category_2_factor: f64,
    pub category_3_factor: f64,
}

impl Default for HolidayCreditRule {
    fn default() -> Self {
        Self { category_1_factor: 1.0, category_2_factor: 0.5, category_3_factor: 0.0 }
    }
}

impl HolidayCreditRule {
    pub fn factor_for(&self, category: u8) -> f64 {
        match category {
            1 => self.category_1_factor,
            2 => self.category_2_factor,
            _ => self.category_3_factor,
        }
    }
}

/// The schedule template for a day type (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub come_from: Option<u16>,
    pub come_to: Option<u16>,
    pub go_from: Option<u16>,
    pub go_to: Option<u16>,
    pub core_start: Option<u16>,
    pub core_end: Option<u16>,
    pub regular_hours: u16,
    pub tolerance: Tolerance,
    pub come_rounding: RoundingPolicy,
    pub go_rounding: RoundingPolicy,
    pub break_rules: Vec<BreakRule>,
    pub bonus_rules: Vec<SurchargeConfig>,
    pub min_work_time: Option<u16>,
    pub max_net_work_time: Option<u16>,
    pub flextime_cap_positive: Option<i32>,
    pub flextime_cap_negative: Option<i32>,
    pub holiday_credit: HolidayCreditRule,
}

impl DayPlan {
    /// Tolerances must be non-negative (always true by `u16`); every
    /// bonus rule must already satisfy the midnight invariant, which
    /// `SurchargeConfig::new` enforces at construction. This re-check
    /// exists for plans assembled by deserializing untrusted input where
    /// the constructor could have been bypassed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for rule in &self.bonus_rules {
            if rule.window.from >= rule.window.to {
                return Err(ValidationError::SurchargeCrossesMidnight {
                    time_from: rule.window.from,
                    time_to: rule.window.to,
                });
            }
        }
        Ok(())
    }
}

/// Where an `EmployeeDayPlan` assignment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    Tariff,
    Manual,
    Holiday,
}

/// Assignment of a `DayPlan` to `(employee, date)`. `day_plan_id = None`
/// encodes an explicit off-day, distinct from "no assignment" (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDayPlan {
    pub employee_id: String,
    pub date: NaiveDate,
    pub day_plan_id: Option<String>,
    pub source: AssignmentSource,
}

impl EmployeeDayPlan {
    pub fn is_explicit_off_day(&self) -> bool {
        self.day_plan_id.is_none()
    }
}
