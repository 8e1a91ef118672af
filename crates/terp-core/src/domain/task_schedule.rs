//! Scheduled tasks and macros (spec.md §3, §4.9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State machine shared by `TaskExecution` and `MacroExecution`:
/// `pending → running → {completed, failed}`, terminal (spec.md §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn can_transition_to(self, to: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        matches!((self, to), (Pending, Running) | (Running, Completed) | (Running, Failed))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

/// Either a weekly (`0=Sunday..6=Saturday`) or monthly (`1..31`,
/// clamped to the last day of a short month) execution day, shared by
/// `ScheduledTask` and `MacroAssignment` (spec.md §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrenceSpec {
    Weekly { weekday: u8, hour: u8, minute: u8 },
    Monthly { day_of_month: u8, hour: u8, minute: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    RecalculateDay,
    ExecuteMacros,
    MonthlyClose,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: String,
    pub tenant_id: String,
    pub task_type: TaskType,
    pub recurrence: RecurrenceSpec,
    pub parameters: serde_json::Value,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskExecution {
    pub id: String,
    pub task_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result_json: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroActionType {
    LogMessage,
    RecalculateTargetHours,
    ResetFlextime,
    CarryForwardBalance,
}

impl MacroActionType {
    /// The registry key used by `scheduler::macros::MacroActionRegistry`.
    pub fn action_code(self) -> &'static str {
        match self {
            MacroActionType::LogMessage => "log_message",
            MacroActionType::RecalculateTargetHours => "recalculate_target_hours",
            MacroActionType::ResetFlextime => "reset_flextime",
            MacroActionType::CarryForwardBalance => "carry_forward_balance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macro {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub recurrence_kind: MacroRecurrenceKind,
    pub action_type: MacroActionType,
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroRecurrenceKind {
    Weekly,
    Monthly,
}

/// What a `Macro` is bound to: exactly one of tariff or employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target")]
pub enum MacroTarget {
    Tariff { tariff_id: String },
    Employee { employee_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroAssignment {
    pub id: String,
    pub macro_id: String,
    pub target: MacroTarget,
    /// `0..6` for weekly macros, `1..31` for monthly.
    pub execution_day: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroExecution {
    pub id: String,
    pub macro_assignment_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_status_transitions() {
        assert!(ExecutionStatus::Pending.can_transition_to(ExecutionStatus::Running));
        assert!(ExecutionStatus::Running.can_transition_to(ExecutionStatus::Completed));
        assert!(ExecutionStatus::Running.can_transition_to(ExecutionStatus::Failed));
        assert!(!ExecutionStatus::Completed.can_transition_to(ExecutionStatus::Running));
        assert!(!ExecutionStatus::Pending.can_transition_to(ExecutionStatus::Completed));
        assert!(ExecutionStatus::Completed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }

    #[test]
    fn action_codes_are_stable() {
        assert_eq!(MacroActionType::LogMessage.action_code(), "log_message");
        assert_eq!(MacroActionType::ResetFlextime.action_code(), "reset_flextime");
    }
}
