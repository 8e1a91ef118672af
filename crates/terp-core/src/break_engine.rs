//! Break deduction (spec.md §4.4).
//!
//! Grounded on the teacher's removed `task::carry_over::CarryOverEngine`:
//! an ordered rule list folded into one required/floor accumulator rather
//! than evaluated independently per rule.

use serde::{Deserialize, Serialize};

use crate::domain::{BreakRule, BreakRuleType, Warning};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreakResult {
    pub break_time: i32,
    pub warnings: Vec<Warning>,
}

#[derive(Default)]
struct Required {
    total: i32,
    floor: i32,
    auto_deduct_total: i32,
}

fn eligible_requirement(rules: &[BreakRule], gross_work_time: i32) -> Required {
    let mut req = Required::default();
    for rule in rules {
        let eligible = match rule.rule_type {
            BreakRuleType::Fixed | BreakRuleType::Variable => true,
            BreakRuleType::Minimum => rule
                .after_work_minutes
                .is_some_and(|after| gross_work_time >= after as i32),
        };
        if !eligible {
            continue;
        }
        let minutes = rule.duration_minutes as i32;
        req.total += minutes;
        if rule.rule_type == BreakRuleType::Minimum {
            req.floor = req.floor.max(minutes);
        }
        if rule.auto_deduct {
            req.auto_deduct_total += minutes;
        }
    }
    req
}

/// Decide deducted break minutes given recorded break-pair time, gross
/// work time, and the plan's break rules (spec.md §4.4).
pub fn calculate_break(
    recorded_break_time: i32,
    gross_work_time: i32,
    rules: &[BreakRule],
) -> BreakResult {
    let required = eligible_requirement(rules, gross_work_time);
    let mut result = BreakResult::default();

    if recorded_break_time > 0 {
        result.break_time = recorded_break_time;
        result.warnings.push(Warning::ManualBreak);
        if recorded_break_time < required.floor {
            result.warnings.push(Warning::ShortBreak);
        }
    } else if required.auto_deduct_total > 0 {
        result.break_time = required.auto_deduct_total;
        result.warnings.push(Warning::AutoBreakApplied);
        if required.floor > 0 {
            result.warnings.push(Warning::NoBreakRecorded);
        }
    }

    result
}

/// `netTime = max(0, grossTime - breakTime)`, clamped to `maxNetWorkTime`
/// with a warning when it truncates (spec.md §4.4).
pub fn apply_net_clamp(gross_time: i32, break_time: i32, max_net_work_time: Option<i32>) -> (i32, bool) {
    let net = (gross_time - break_time).max(0);
    match max_net_work_time {
        Some(max) if net > max => (max, true),
        _ => (net, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimum_rule(duration: u16, after: u16, auto: bool) -> BreakRule {
        BreakRule {
            rule_type: BreakRuleType::Minimum,
            duration_minutes: duration,
            after_work_minutes: Some(after),
            auto_deduct: auto,
            is_paid: false,
            window: None,
        }
    }

    #[test]
    fn no_recorded_break_and_no_auto_deduct_takes_nothing() {
        let rules = vec![minimum_rule(30, 360, false)];
        let result = calculate_break(0, 540, &rules);
        assert_eq!(result.break_time, 0);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn auto_deduct_applies_when_eligible_and_nothing_recorded() {
        let rules = vec![minimum_rule(30, 360, true)];
        let result = calculate_break(0, 540, &rules);
        assert_eq!(result.break_time, 30);
        assert!(result.warnings.contains(&Warning::AutoBreakApplied));
        assert!(result.warnings.contains(&Warning::NoBreakRecorded));
    }

    #[test]
    fn minimum_rule_ineligible_before_threshold() {
        let rules = vec![minimum_rule(30, 360, true)];
        let result = calculate_break(0, 300, &rules);
        assert_eq!(result.break_time, 0);
    }

    #[test]
    fn recorded_break_below_floor_warns_short() {
        let rules = vec![minimum_rule(30, 360, true)];
        let result = calculate_break(10, 540, &rules);
        assert_eq!(result.break_time, 10);
        assert!(result.warnings.contains(&Warning::ManualBreak));
        assert!(result.warnings.contains(&Warning::ShortBreak));
    }

    #[test]
    fn recorded_break_at_or_above_floor_no_short_warning() {
        let rules = vec![minimum_rule(30, 360, true)];
        let result = calculate_break(30, 540, &rules);
        assert!(result.warnings.contains(&Warning::ManualBreak));
        assert!(!result.warnings.contains(&Warning::ShortBreak));
    }

    #[test]
    fn net_clamp_caps_and_warns() {
        let (net, capped) = apply_net_clamp(600, 0, Some(540));
        assert_eq!(net, 540);
        assert!(capped);
        let (net, capped) = apply_net_clamp(500, 0, Some(540));
        assert_eq!(net, 500);
        assert!(!capped);
    }

    #[test]
    fn net_never_goes_negative() {
        let (net, _) = apply_net_clamp(100, 200, None);
        assert_eq!(net, 0);
    }
}
