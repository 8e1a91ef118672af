//! Overlap-based surcharge attribution (spec.md §4.3).
//!
//! Grounded on `MinuteWindow::overlap_minutes` (`time.rs`), itself shaped
//! after the teacher's `TimeGap`/overlap arithmetic in `timeline/gap.rs`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::SurchargeConfig;
use crate::time::TimePeriod;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeEntry {
    pub account_id: String,
    pub account_code: String,
    pub minutes: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurchargeResult {
    pub surcharges: Vec<SurchargeEntry>,
    pub total_minutes: i32,
}

impl SurchargeResult {
    /// Per-account minute map, as stored on `DailyValue::surcharges`.
    pub fn as_map(&self) -> BTreeMap<String, i32> {
        self.surcharges.iter().map(|e| (e.account_id.clone(), e.minutes)).collect()
    }
}

fn is_applicable(config: &SurchargeConfig, is_holiday: bool, holiday_category: Option<u8>) -> bool {
    if is_holiday {
        config.applies_on_holiday
            && (config.holiday_categories.is_empty()
                || holiday_category.is_some_and(|c| config.holiday_categories.contains(&c)))
    } else {
        config.applies_on_workday
    }
}

/// Attribute surcharge minutes across `periods` (work pairs only), per
/// applicable `SurchargeConfig` (spec.md §4.3).
pub fn calculate_surcharges(
    periods: &[TimePeriod],
    configs: &[SurchargeConfig],
    is_holiday: bool,
    holiday_category: Option<u8>,
) -> SurchargeResult {
    let mut result = SurchargeResult::default();

    for config in configs {
        if !is_applicable(config, is_holiday, holiday_category) {
            continue;
        }
        let minutes: i32 = periods
            .iter()
            .map(|p| config.window.overlap_minutes(p.start, p.end))
            .sum();
        if minutes > 0 {
            result.total_minutes += minutes;
            result.surcharges.push(SurchargeEntry {
                account_id: config.account_id.clone(),
                account_code: config.account_code.clone(),
                minutes,
            });
        }
    }

    result
}
