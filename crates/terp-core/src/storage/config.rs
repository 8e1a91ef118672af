//! TOML-based scheduler/tenant configuration (SPEC_FULL.md §1).
//!
//! Adapted from the teacher's `storage::config::Config`: same
//! `from_path`/`default()`/`toml` load-or-default shape, re-keyed to the
//! scheduler's own dials instead of GUI theme/window preferences.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Dials governing the always-on scheduler daemon loop (spec.md §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_executor_timeout_secs")]
    pub executor_timeout_secs: u64,
    /// Recalculation never walks further back than this many months from
    /// "today" (spec.md §4.8: "never all history").
    #[serde(default = "default_recalc_window_months")]
    pub recalc_window_months: u32,
}

fn default_tick_interval_secs() -> u64 {
    60
}
fn default_executor_timeout_secs() -> u64 {
    300
}
fn default_recalc_window_months() -> u32 {
    13
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            executor_timeout_secs: default_executor_timeout_secs(),
            recalc_window_months: default_recalc_window_months(),
        }
    }
}

impl SchedulerConfig {
    pub fn load_or_default(path: &Path) -> Self {
        Self::from_path(path).unwrap_or_default()
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed { path: path.to_path_buf(), message: e.to_string() })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed { path: path.to_path_buf(), message: e.to_string() })
    }
}

/// Per-tenant defaults that seed newly-created `DayPlan`s and flextime
/// carryover, absent a more specific override (spec.md §3, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    pub tenant_id: String,
    #[serde(default = "default_flextime_cap_positive")]
    pub default_flextime_cap_positive: Option<i32>,
    #[serde(default = "default_flextime_cap_negative")]
    pub default_flextime_cap_negative: Option<i32>,
    /// Open Question (a), SPEC_FULL.md §2: category-2 holiday credit
    /// factor when a tenant has not configured its own `HolidayCreditRule`.
    #[serde(default = "default_partial_credit_factor")]
    pub default_partial_credit_factor: f64,
}

fn default_flextime_cap_positive() -> Option<i32> {
    None
}
fn default_flextime_cap_negative() -> Option<i32> {
    None
}
fn default_partial_credit_factor() -> f64 {
    0.5
}

/// Directory conventions, analogous to the teacher's `data_dir()`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    let dir = base.join("terp");
    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::SaveFailed { path: dir.clone(), message: e.to_string() })?;
    Ok(dir)
}
