//! Tenant-scoped message catalog: error/warning codes map to display
//! text, overridable per tenant (spec.md §6, §9 — "Correction message
//! catalog" in SPEC_FULL.md §2).
//!
//! Same TOML load/save shape as `storage::config::Config`; the override
//! table itself is lazy-seeded in memory rather than loaded eagerly for
//! every known tenant.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::domain::{ErrorCode, Warning};
use crate::error::ConfigError;

fn built_in_defaults() -> HashMap<String, String> {
    let mut m = HashMap::new();
    for code in [
        ErrorCode::MissingCome,
        ErrorCode::MissingGo,
        ErrorCode::UnpairedBooking,
        ErrorCode::EarlyCome,
        ErrorCode::LateCome,
        ErrorCode::EarlyGo,
        ErrorCode::LateGo,
        ErrorCode::MissedCoreStart,
        ErrorCode::MissedCoreEnd,
        ErrorCode::BelowMinWorkTime,
        ErrorCode::NoBookings,
        ErrorCode::InvalidTime,
        ErrorCode::DuplicateInTime,
        ErrorCode::NoMatchingShift,
    ] {
        m.insert(code.as_str().to_string(), default_text_for(code.as_str()));
    }
    for warning in [
        Warning::CrossMidnight,
        Warning::MaxTimeReached,
        Warning::ManualBreak,
        Warning::AutoBreakApplied,
        Warning::NoBreakRecorded,
        Warning::ShortBreak,
        Warning::MonthlyCap,
        Warning::FlextimeCapped,
        Warning::BelowThreshold,
        Warning::NoCarryover,
        Warning::AbsenceOnHoliday,
    ] {
        m.insert(warning.as_str().to_string(), default_text_for(warning.as_str()));
    }
    m
}

fn default_text_for(code: &str) -> String {
    match code {
        "MISSING_COME" => "No arrival booking recorded for this day",
        "MISSING_GO" => "No departure booking recorded for this day",
        "UNPAIRED_BOOKING" => "A booking could not be paired with a matching direction",
        "EARLY_COME" => "Arrival is earlier than the plan allows",
        "LATE_COME" => "Arrival is later than the plan allows",
        "EARLY_GO" => "Departure is earlier than the plan allows",
        "LATE_GO" => "Departure is later than the plan allows",
        "MISSED_CORE_START" => "Core time window was not covered at the start",
        "MISSED_CORE_END" => "Core time window was not covered at the end",
        "BELOW_MIN_WORK_TIME" => "Net work time is below the plan's minimum",
        "NO_BOOKINGS" => "No bookings exist for this day",
        "INVALID_TIME" => "A booking time is outside the valid range",
        "DUPLICATE_IN_TIME" => "Two bookings share the same direction and time",
        "NO_MATCHING_SHIFT" => "No day plan is assigned for this date",
        "CROSS_MIDNIGHT" => "This shift crosses midnight",
        "MAX_TIME_REACHED" => "Net work time was capped at the plan's maximum",
        "MANUAL_BREAK" => "A break was recorded manually",
        "AUTO_BREAK_APPLIED" => "A break was deducted automatically",
        "NO_BREAK_RECORDED" => "No break was recorded though one is expected",
        "SHORT_BREAK" => "The recorded break is shorter than required",
        "MONTHLY_CAP" => "A monthly account total was capped",
        "FLEXTIME_CAPPED" => "Flextime balance was capped at its configured limit",
        "BELOW_THRESHOLD" => "Absence portion fell below the credited threshold",
        "NO_CARRYOVER" => "No flextime balance carried over from last month",
        "ABSENCE_ON_HOLIDAY" => "An absence was recorded on a holiday",
        other => other,
    }
    .to_string()
}

/// On-disk representation: only overrides are ever serialized — the
/// built-in defaults live in code, not in a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogOverrides {
    pub tenants: HashMap<String, HashMap<String, String>>,
}

/// Tenant-scoped code→text lookup. A tenant's override table is seeded
/// from the built-in defaults the first time it is touched, so a
/// `set_override` for one code doesn't require supplying the rest.
pub struct MessageCatalog {
    defaults: HashMap<String, String>,
    tenants: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self { defaults: built_in_defaults(), tenants: Mutex::new(HashMap::new()) }
    }

    /// Text for `code` as seen by `tenant_id`: a tenant override if one
    /// has been set, otherwise the built-in default, otherwise the code
    /// itself (never panics on an unknown code).
    pub fn text_for(&self, tenant_id: &str, code: &str) -> String {
        let tenants = self.tenants.lock().expect("catalog mutex poisoned");
        if let Some(overrides) = tenants.get(tenant_id) {
            if let Some(text) = overrides.get(code) {
                return text.clone();
            }
        }
        self.defaults.get(code).cloned().unwrap_or_else(|| code.to_string())
    }

    /// Seeds the tenant's table from the defaults on first call, then
    /// sets the override.
    pub fn set_override(&self, tenant_id: &str, code: &str, text: impl Into<String>) {
        let mut tenants = self.tenants.lock().expect("catalog mutex poisoned");
        let overrides = tenants.entry(tenant_id.to_string()).or_insert_with(|| self.defaults.clone());
        overrides.insert(code.to_string(), text.into());
    }

    pub fn load_overrides(&self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed { path: path.to_path_buf(), message: e.to_string() })?;
        let parsed: CatalogOverrides =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        let mut tenants = self.tenants.lock().expect("catalog mutex poisoned");
        for (tenant_id, overrides) in parsed.tenants {
            let entry = tenants.entry(tenant_id).or_insert_with(|| self.defaults.clone());
            entry.extend(overrides);
        }
        Ok(())
    }

    pub fn save_overrides(&self, path: &Path) -> Result<(), ConfigError> {
        let tenants = self.tenants.lock().expect("catalog mutex poisoned").clone();
        let content = toml::to_string_pretty(&CatalogOverrides { tenants })
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed { path: path.to_path_buf(), message: e.to_string() })
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}
