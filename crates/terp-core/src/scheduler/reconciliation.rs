//! Force-transition of stuck `running` executions past their timeout
//! (spec.md §4.9, §7: "a stuck running row beyond its timeout is
//! force-transitioned").

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ExecutionStatus;

/// Default dispatch timeout. Exceeding it transitions a `running`
/// execution to `failed` without waiting for the executor.
pub const DEFAULT_TIMEOUT_SECS: i64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    pub timeout_secs: i64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_TIMEOUT_SECS }
    }
}

/// Anything with an `ExecutionStatus` and a `started_at`, satisfied by
/// both `TaskExecution` and `MacroExecution`.
pub trait Execution {
    fn status(&self) -> ExecutionStatus;
    fn started_at(&self) -> DateTime<Utc>;
    fn id(&self) -> &str;
}

impl Execution for crate::domain::TaskExecution {
    fn status(&self) -> ExecutionStatus {
        self.status
    }
    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
    fn id(&self) -> &str {
        &self.id
    }
}

impl Execution for crate::domain::MacroExecution {
    fn status(&self) -> ExecutionStatus {
        self.status
    }
    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckExecution {
    pub id: String,
    pub stale_for_secs: i64,
}

/// Detect `running` executions that have exceeded their timeout. Pure
/// and read-only; the caller performs the actual `running -> failed`
/// write through its repository.
pub fn detect_stuck<E: Execution>(
    executions: &[E],
    config: &ReconciliationConfig,
    now: DateTime<Utc>,
) -> Vec<StuckExecution> {
    let timeout = Duration::seconds(config.timeout_secs);
    executions
        .iter()
        .filter(|e| e.status() == ExecutionStatus::Running)
        .filter_map(|e| {
            let age = now.signed_duration_since(e.started_at());
            (age > timeout).then(|| StuckExecution {
                id: e.id().to_string(),
                stale_for_secs: (age - timeout).num_seconds().max(0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskExecution;

    fn execution(id: &str, status: ExecutionStatus, started_at: DateTime<Utc>) -> TaskExecution {
        TaskExecution {
            id: id.into(),
            task_id: "t1".into(),
            status,
            started_at,
            completed_at: None,
            result_json: None,
            error_message: None,
        }
    }

    #[test]
    fn running_past_timeout_is_stuck() {
        let now = Utc::now();
        let executions =
            vec![execution("e1", ExecutionStatus::Running, now - Duration::seconds(400))];
        let config = ReconciliationConfig { timeout_secs: 300 };
        let stuck = detect_stuck(&executions, &config, now);
        assert_eq!(stuck.len(), 1);
        assert_eq!(stuck[0].id, "e1");
    }

    #[test]
    fn running_within_timeout_is_not_stuck() {
        let now = Utc::now();
        let executions =
            vec![execution("e1", ExecutionStatus::Running, now - Duration::seconds(100))];
        let config = ReconciliationConfig { timeout_secs: 300 };
        assert!(detect_stuck(&executions, &config, now).is_empty());
    }

    #[test]
    fn completed_and_failed_are_never_stuck() {
        let now = Utc::now();
        let executions = vec![
            execution("e1", ExecutionStatus::Completed, now - Duration::seconds(9999)),
            execution("e2", ExecutionStatus::Failed, now - Duration::seconds(9999)),
            execution("e3", ExecutionStatus::Pending, now - Duration::seconds(9999)),
        ];
        let config = ReconciliationConfig::default();
        assert!(detect_stuck(&executions, &config, now).is_empty());
    }
}
