//! Abstract repository contracts (spec.md §6).
//!
//! No concrete storage mechanism is specified here; `storage::memory`
//! and `storage::sqlite` are two implementations. Grounded on the
//! teacher's absence of any persistence-trait boundary — this module is
//! new, following the `#[async_trait]` convention used across the async
//! ecosystem for object-safe repository traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    AbsenceDay, Booking, DailyValue, EmployeeDayPlan, Holiday, Macro, MacroAssignment,
    MacroExecution, MonthlyValue, ScheduledTask, TaskExecution, VacationBalance,
};
use crate::error::RepoError;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Clone, Default)]
pub struct DailyValueFilter {
    pub employee_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub has_errors: Option<bool>,
}

#[async_trait]
pub trait BookingRepo: Send + Sync {
    async fn list_for_employee_date(
        &self,
        tenant_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Vec<Booking>>;
    async fn create(&self, booking: &Booking) -> RepoResult<()>;
    async fn update(&self, booking: &Booking) -> RepoResult<()>;
    async fn delete(&self, tenant_id: &str, id: &str) -> RepoResult<()>;
    async fn delete_derived_by_original(&self, tenant_id: &str, original_id: &str) -> RepoResult<()>;
    async fn get_derived_by_original(
        &self,
        tenant_id: &str,
        original_id: &str,
    ) -> RepoResult<Vec<Booking>>;
}

#[async_trait]
pub trait EmployeeDayPlanRepo: Send + Sync {
    /// Returns the assignment with its `DayPlan` already resolved, per
    /// spec.md §9's "single immutable snapshot". `DayPlan` is `None` for
    /// an explicit off-day assignment (`day_plan_id = None`).
    async fn get_for_employee_date(
        &self,
        tenant_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<(EmployeeDayPlan, Option<crate::domain::DayPlan>)>>;
    async fn upsert(&self, assignment: &EmployeeDayPlan) -> RepoResult<()>;
}

#[async_trait]
pub trait HolidayRepo: Send + Sync {
    async fn get_by_date(&self, tenant_id: &str, date: NaiveDate) -> RepoResult<Option<Holiday>>;
    async fn list(&self, tenant_id: &str, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Holiday>>;
}

#[async_trait]
pub trait AbsenceDayRepo: Send + Sync {
    /// Non-cancelled only, per spec.md §6.
    async fn get_by_employee_date(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<AbsenceDay>>;
    async fn list(&self, tenant_id: &str, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<AbsenceDay>>;
}

#[async_trait]
pub trait DailyValueRepo: Send + Sync {
    async fn upsert(&self, value: &DailyValue) -> RepoResult<()>;
    async fn list(&self, tenant_id: &str, filter: &DailyValueFilter) -> RepoResult<Vec<DailyValue>>;
}

#[async_trait]
pub trait MonthlyValueRepo: Send + Sync {
    async fn upsert(&self, value: &MonthlyValue) -> RepoResult<()>;
    async fn list(&self, employee_id: &str, year: i32) -> RepoResult<Vec<MonthlyValue>>;
}

#[async_trait]
pub trait ScheduleRepo: Send + Sync {
    async fn select_due(&self, now: chrono::DateTime<chrono::Utc>) -> RepoResult<Vec<ScheduledTask>>;
    async fn update_next_run(&self, task_id: &str, next_run_at: chrono::DateTime<chrono::Utc>) -> RepoResult<()>;
}

#[async_trait]
pub trait TaskExecutionRepo: Send + Sync {
    /// Conditional insert: fails with `Conflict` if an execution for
    /// this task is already `running` (spec.md §5, §4.9).
    async fn create_if_absent(&self, execution: &TaskExecution) -> RepoResult<bool>;
    async fn update_status(
        &self,
        id: &str,
        status: crate::domain::ExecutionStatus,
        result_json: Option<serde_json::Value>,
        error_message: Option<String>,
    ) -> RepoResult<()>;
    async fn list_running(&self) -> RepoResult<Vec<TaskExecution>>;
}

#[async_trait]
pub trait MacroRepo: Send + Sync {
    async fn list_active_by_type(
        &self,
        tenant_id: &str,
        kind: crate::domain::MacroRecurrenceKind,
    ) -> RepoResult<Vec<(Macro, Vec<MacroAssignment>)>>;
}

#[async_trait]
pub trait MacroExecutionRepo: Send + Sync {
    async fn create_if_absent(&self, execution: &MacroExecution) -> RepoResult<bool>;
    async fn update_status(
        &self,
        id: &str,
        status: crate::domain::ExecutionStatus,
        error_message: Option<String>,
    ) -> RepoResult<()>;
    async fn list_running(&self) -> RepoResult<Vec<MacroExecution>>;
}

#[async_trait]
pub trait AuditLogRepo: Send + Sync {
    async fn append(&self, tenant_id: &str, entry: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait VacationBalanceRepo: Send + Sync {
    async fn get(&self, employee_id: &str, year: i32) -> RepoResult<Option<VacationBalance>>;
    async fn upsert(&self, balance: &VacationBalance) -> RepoResult<()>;
}
