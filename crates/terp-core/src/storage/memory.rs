//! In-memory reference implementations of every repository trait
//! (spec.md §6), used by the CLI and by tests.
//!
//! Structurally the same "plain struct wrapping guarded state" shape as
//! the teacher's `storage::database::Database`, minus SQL: each entity
//! kind gets its own `Mutex<Vec<_>>` and linear-scan lookups, which is
//! plenty fast at the scale this crate targets.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    AbsenceDay, Booking, DailyValue, DayPlan, EmployeeDayPlan, ExecutionStatus, Holiday, Macro,
    MacroAssignment, MacroExecution, MacroRecurrenceKind, MonthlyValue, ScheduledTask,
    TaskExecution, VacationBalance,
};
use crate::error::RepoError;
use crate::repo::{
    AbsenceDayRepo, AuditLogRepo, BookingRepo, DailyValueFilter, DailyValueRepo,
    EmployeeDayPlanRepo, HolidayRepo, MacroExecutionRepo, MacroRepo, MonthlyValueRepo, RepoResult,
    ScheduleRepo, TaskExecutionRepo, VacationBalanceRepo,
};

#[derive(Default)]
pub struct InMemoryStore {
    bookings: Mutex<Vec<Booking>>,
    day_plans: Mutex<Vec<DayPlan>>,
    assignments: Mutex<Vec<EmployeeDayPlan>>,
    holidays: Mutex<Vec<Holiday>>,
    absences: Mutex<Vec<AbsenceDay>>,
    daily_values: Mutex<Vec<DailyValue>>,
    monthly_values: Mutex<Vec<MonthlyValue>>,
    scheduled_tasks: Mutex<Vec<ScheduledTask>>,
    task_executions: Mutex<Vec<TaskExecution>>,
    macros: Mutex<Vec<Macro>>,
    macro_assignments: Mutex<Vec<MacroAssignment>>,
    macro_executions: Mutex<Vec<MacroExecution>>,
    audit_log: Mutex<Vec<(String, String)>>,
    vacation_balances: Mutex<Vec<VacationBalance>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().expect("in-memory store mutex poisoned")
    }

    pub fn seed_day_plan(&self, plan: DayPlan) {
        Self::lock(&self.day_plans).push(plan);
    }

    pub fn seed_assignment(&self, assignment: EmployeeDayPlan) {
        Self::lock(&self.assignments).push(assignment);
    }

    pub fn seed_holiday(&self, holiday: Holiday) {
        Self::lock(&self.holidays).push(holiday);
    }

    pub fn seed_absence(&self, absence: AbsenceDay) {
        Self::lock(&self.absences).push(absence);
    }

    pub fn seed_scheduled_task(&self, task: ScheduledTask) {
        Self::lock(&self.scheduled_tasks).push(task);
    }

    pub fn seed_macro(&self, macro_def: Macro, assignments: Vec<MacroAssignment>) {
        Self::lock(&self.macros).push(macro_def);
        Self::lock(&self.macro_assignments).extend(assignments);
    }
}

#[async_trait::async_trait]
impl BookingRepo for InMemoryStore {
    async fn list_for_employee_date(
        &self,
        tenant_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Vec<Booking>> {
        Ok(Self::lock(&self.bookings)
            .iter()
            .filter(|b| b.tenant_id == tenant_id && b.employee_id == employee_id && b.date == date)
            .cloned()
            .collect())
    }

    async fn create(&self, booking: &Booking) -> RepoResult<()> {
        booking.validate().map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        Self::lock(&self.bookings).push(booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> RepoResult<()> {
        booking.validate().map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        let mut bookings = Self::lock(&self.bookings);
        match bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                Ok(())
            }
            None => Err(RepoError::NotFound(booking.id.clone())),
        }
    }

    async fn delete(&self, tenant_id: &str, id: &str) -> RepoResult<()> {
        Self::lock(&self.bookings).retain(|b| !(b.tenant_id == tenant_id && b.id == id));
        Ok(())
    }

    async fn delete_derived_by_original(&self, tenant_id: &str, original_id: &str) -> RepoResult<()> {
        Self::lock(&self.bookings).retain(|b| {
            !(b.tenant_id == tenant_id && b.original_booking_id.as_deref() == Some(original_id))
        });
        Ok(())
    }

    async fn get_derived_by_original(
        &self,
        tenant_id: &str,
        original_id: &str,
    ) -> RepoResult<Vec<Booking>> {
        Ok(Self::lock(&self.bookings)
            .iter()
            .filter(|b| b.tenant_id == tenant_id && b.original_booking_id.as_deref() == Some(original_id))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl EmployeeDayPlanRepo for InMemoryStore {
    async fn get_for_employee_date(
        &self,
        _tenant_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<(EmployeeDayPlan, Option<DayPlan>)>> {
        let assignment = Self::lock(&self.assignments)
            .iter()
            .find(|a| a.employee_id == employee_id && a.date == date)
            .cloned();
        let Some(assignment) = assignment else { return Ok(None) };
        let plan = match &assignment.day_plan_id {
            Some(id) => Self::lock(&self.day_plans).iter().find(|p| &p.id == id).cloned(),
            None => None,
        };
        Ok(Some((assignment, plan)))
    }

    async fn upsert(&self, assignment: &EmployeeDayPlan) -> RepoResult<()> {
        let mut assignments = Self::lock(&self.assignments);
        match assignments
            .iter_mut()
            .find(|a| a.employee_id == assignment.employee_id && a.date == assignment.date)
        {
            Some(existing) => *existing = assignment.clone(),
            None => assignments.push(assignment.clone()),
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl HolidayRepo for InMemoryStore {
    async fn get_by_date(&self, tenant_id: &str, date: NaiveDate) -> RepoResult<Option<Holiday>> {
        Ok(Self::lock(&self.holidays)
            .iter()
            .find(|h| h.tenant_id == tenant_id && h.date == date)
            .cloned())
    }

    async fn list(&self, tenant_id: &str, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Holiday>> {
        Ok(Self::lock(&self.holidays)
            .iter()
            .filter(|h| h.tenant_id == tenant_id && h.date >= from && h.date <= to)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl AbsenceDayRepo for InMemoryStore {
    async fn get_by_employee_date(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<AbsenceDay>> {
        Ok(Self::lock(&self.absences)
            .iter()
            .find(|a| a.employee_id == employee_id && a.date == date && !a.is_cancelled())
            .cloned())
    }

    async fn list(&self, _tenant_id: &str, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<AbsenceDay>> {
        Ok(Self::lock(&self.absences)
            .iter()
            .filter(|a| a.date >= from && a.date <= to && !a.is_cancelled())
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl DailyValueRepo for InMemoryStore {
    async fn upsert(&self, value: &DailyValue) -> RepoResult<()> {
        let mut values = Self::lock(&self.daily_values);
        match values
            .iter_mut()
            .find(|v| v.employee_id == value.employee_id && v.date == value.date)
        {
            Some(existing) => *existing = value.clone(),
            None => values.push(value.clone()),
        }
        Ok(())
    }

    async fn list(&self, _tenant_id: &str, filter: &DailyValueFilter) -> RepoResult<Vec<DailyValue>> {
        Ok(Self::lock(&self.daily_values)
            .iter()
            .filter(|v| filter.employee_id.as_deref().map_or(true, |id| id == v.employee_id))
            .filter(|v| filter.from.map_or(true, |from| v.date >= from))
            .filter(|v| filter.to.map_or(true, |to| v.date <= to))
            .filter(|v| filter.has_errors.map_or(true, |has_errors| v.has_error() == has_errors))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl MonthlyValueRepo for InMemoryStore {
    async fn upsert(&self, value: &MonthlyValue) -> RepoResult<()> {
        let mut values = Self::lock(&self.monthly_values);
        match values.iter_mut().find(|v| {
            v.employee_id == value.employee_id && v.year == value.year && v.month == value.month
        }) {
            Some(existing) => *existing = value.clone(),
            None => values.push(value.clone()),
        }
        Ok(())
    }

    async fn list(&self, employee_id: &str, year: i32) -> RepoResult<Vec<MonthlyValue>> {
        Ok(Self::lock(&self.monthly_values)
            .iter()
            .filter(|v| v.employee_id == employee_id && v.year == year)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl ScheduleRepo for InMemoryStore {
    async fn select_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<ScheduledTask>> {
        Ok(Self::lock(&self.scheduled_tasks)
            .iter()
            .filter(|t| t.next_run_at <= now)
            .cloned()
            .collect())
    }

    async fn update_next_run(&self, task_id: &str, next_run_at: DateTime<Utc>) -> RepoResult<()> {
        let mut tasks = Self::lock(&self.scheduled_tasks);
        match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.last_run_at = Some(task.next_run_at);
                task.next_run_at = next_run_at;
                Ok(())
            }
            None => Err(RepoError::NotFound(task_id.to_string())),
        }
    }
}

#[async_trait::async_trait]
impl TaskExecutionRepo for InMemoryStore {
    async fn create_if_absent(&self, execution: &TaskExecution) -> RepoResult<bool> {
        let mut executions = Self::lock(&self.task_executions);
        let already_running = executions
            .iter()
            .any(|e| e.task_id == execution.task_id && e.status == ExecutionStatus::Running);
        if already_running {
            return Ok(false);
        }
        executions.push(execution.clone());
        Ok(true)
    }

    async fn update_status(
        &self,
        id: &str,
        status: ExecutionStatus,
        result_json: Option<serde_json::Value>,
        error_message: Option<String>,
    ) -> RepoResult<()> {
        let mut executions = Self::lock(&self.task_executions);
        match executions.iter_mut().find(|e| e.id == id) {
            Some(execution) => {
                execution.status = status;
                execution.completed_at = Some(Utc::now());
                execution.result_json = result_json;
                execution.error_message = error_message;
                Ok(())
            }
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    async fn list_running(&self) -> RepoResult<Vec<TaskExecution>> {
        Ok(Self::lock(&self.task_executions)
            .iter()
            .filter(|e| e.status == ExecutionStatus::Running)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl MacroRepo for InMemoryStore {
    async fn list_active_by_type(
        &self,
        tenant_id: &str,
        kind: MacroRecurrenceKind,
    ) -> RepoResult<Vec<(Macro, Vec<MacroAssignment>)>> {
        let macro_assignments = Self::lock(&self.macro_assignments);
        Ok(Self::lock(&self.macros)
            .iter()
            .filter(|m| m.tenant_id == tenant_id && m.recurrence_kind == kind)
            .map(|m| {
                let assignments = macro_assignments
                    .iter()
                    .filter(|a| a.macro_id == m.id)
                    .cloned()
                    .collect();
                (m.clone(), assignments)
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl MacroExecutionRepo for InMemoryStore {
    async fn create_if_absent(&self, execution: &MacroExecution) -> RepoResult<bool> {
        let mut executions = Self::lock(&self.macro_executions);
        let already_running = executions.iter().any(|e| {
            e.macro_assignment_id == execution.macro_assignment_id
                && e.status == ExecutionStatus::Running
        });
        if already_running {
            return Ok(false);
        }
        executions.push(execution.clone());
        Ok(true)
    }

    async fn update_status(
        &self,
        id: &str,
        status: ExecutionStatus,
        error_message: Option<String>,
    ) -> RepoResult<()> {
        let mut executions = Self::lock(&self.macro_executions);
        match executions.iter_mut().find(|e| e.id == id) {
            Some(execution) => {
                execution.status = status;
                execution.completed_at = Some(Utc::now());
                execution.error_message = error_message;
                Ok(())
            }
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    async fn list_running(&self) -> RepoResult<Vec<MacroExecution>> {
        Ok(Self::lock(&self.macro_executions)
            .iter()
            .filter(|e| e.status == ExecutionStatus::Running)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl AuditLogRepo for InMemoryStore {
    async fn append(&self, tenant_id: &str, entry: &str) -> RepoResult<()> {
        Self::lock(&self.audit_log).push((tenant_id.to_string(), entry.to_string()));
        Ok(())
    }
}

#[async_trait::async_trait]
impl VacationBalanceRepo for InMemoryStore {
    async fn get(&self, employee_id: &str, year: i32) -> RepoResult<Option<VacationBalance>> {
        Ok(Self::lock(&self.vacation_balances)
            .iter()
            .find(|b| b.employee_id == employee_id && b.year == year)
            .cloned())
    }

    async fn upsert(&self, balance: &VacationBalance) -> RepoResult<()> {
        let mut balances = Self::lock(&self.vacation_balances);
        match balances
            .iter_mut()
            .find(|b| b.employee_id == balance.employee_id && b.year == balance.year)
        {
            Some(existing) => *existing = balance.clone(),
            None => balances.push(balance.clone()),
        }
        Ok(())
    }
}
