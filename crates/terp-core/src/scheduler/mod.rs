//! Scheduled-task next-run computation and at-most-once dispatch
//! (spec.md §4.9).
//!
//! Grounded on the teacher's `AutoScheduler::generate_schedule`: a pure
//! function computes what should happen next, a thin async driver
//! performs the I/O. `reconciliation` is the sibling module that sweeps
//! up executions this driver abandoned mid-flight.

pub mod reconciliation;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::domain::{ExecutionStatus, RecurrenceSpec, ScheduledTask, TaskExecution};
use crate::error::SchedulerError;
use crate::events::{DomainEvent, EventBus};
use crate::repo::{RepoResult, ScheduleRepo, TaskExecutionRepo};

/// Last day of the given year/month, used to clamp a configured
/// `day_of_month` that does not exist in a given month (spec.md §8/§9's
/// "configured for the 31st, clamp to Feb 28/29" example).
pub(crate) fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("valid next month")
        .pred_opt()
        .expect("month has at least one day")
        .day()
}

/// Compute the next run instant strictly after `after`, given the
/// schedule's recurrence rule (spec.md §4.9). Pure and total.
pub fn next_run_after(recurrence: &RecurrenceSpec, after: DateTime<Utc>) -> DateTime<Utc> {
    match recurrence {
        RecurrenceSpec::Weekly { weekday, hour, minute } => {
            let target_weekday = *weekday as i64 % 7;
            let mut candidate = after.date_naive();
            loop {
                let candidate_weekday = candidate.weekday().num_days_from_sunday() as i64;
                let days_ahead = (target_weekday - candidate_weekday).rem_euclid(7);
                let try_date = candidate + chrono::Duration::days(days_ahead);
                let at = Utc
                    .with_ymd_and_hms(try_date.year(), try_date.month(), try_date.day(), *hour as u32, *minute as u32, 0)
                    .single()
                    .expect("valid clock time");
                if at > after {
                    return at;
                }
                candidate = try_date + chrono::Duration::days(1);
            }
        }
        RecurrenceSpec::Monthly { day_of_month, hour, minute } => {
            let mut year = after.year();
            let mut month = after.month();
            loop {
                let day = (*day_of_month as u32).min(last_day_of_month(year, month));
                let at = Utc
                    .with_ymd_and_hms(year, month, day, *hour as u32, *minute as u32, 0)
                    .single()
                    .expect("valid clock time");
                if at > after {
                    return at;
                }
                if month == 12 {
                    year += 1;
                    month = 1;
                } else {
                    month += 1;
                }
            }
        }
    }
}

/// A scheduled task is eligible for dispatch when its `next_run_at` has
/// arrived and no execution for it is currently `running` (spec.md §5:
/// at most one in-flight execution per task).
pub fn select_due<'a>(
    tasks: &'a [ScheduledTask],
    running_task_ids: &std::collections::HashSet<&str>,
    now: DateTime<Utc>,
) -> Vec<&'a ScheduledTask> {
    tasks
        .iter()
        .filter(|t| t.next_run_at <= now && !running_task_ids.contains(t.id.as_str()))
        .collect()
}

/// An executor dispatches a `TaskExecution` by `task_type` and reports
/// back its terminal outcome. Implementations live outside terp-core
/// (terp-cli wires concrete actions); this trait is the dispatch seam
/// named in spec.md §9.
#[async_trait::async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &ScheduledTask) -> Result<serde_json::Value, String>;
}

/// One scheduler tick: select due tasks, open a `running` execution for
/// each (skipping any the repository reports as already in flight),
/// dispatch, record the terminal status, and recompute `next_run_at`.
/// At-most-once per task per tick; a task whose `create_if_absent` loses
/// the race is left for the next tick (spec.md §4.9, §5).
pub async fn tick(
    schedule_repo: &dyn ScheduleRepo,
    execution_repo: &dyn TaskExecutionRepo,
    executor: &dyn TaskExecutor,
    bus: &EventBus,
    now: DateTime<Utc>,
) -> RepoResult<Vec<String>> {
    let mut dispatched = Vec::new();
    for task in schedule_repo.select_due(now).await? {
        let execution = TaskExecution {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task.id.clone(),
            status: ExecutionStatus::Running,
            started_at: now,
            completed_at: None,
            result_json: None,
            error_message: None,
        };
        if !execution_repo.create_if_absent(&execution).await? {
            continue;
        }
        dispatched.push(execution.id.clone());
        match executor.execute(&task).await {
            Ok(result) => {
                execution_repo
                    .update_status(&execution.id, ExecutionStatus::Completed, Some(result), None)
                    .await?;
                bus.publish(DomainEvent::TaskExecutionCompleted {
                    task_id: task.id.clone(),
                    at: Utc::now(),
                });
            }
            Err(message) => {
                execution_repo
                    .update_status(&execution.id, ExecutionStatus::Failed, None, Some(message.clone()))
                    .await?;
                bus.publish(DomainEvent::TaskExecutionFailed {
                    task_id: task.id.clone(),
                    error_message: message,
                    at: Utc::now(),
                });
            }
        }
        let next = next_run_after(&task.recurrence, now);
        schedule_repo.update_next_run(&task.id, next).await?;
    }
    Ok(dispatched)
}

/// Validate a recurrence rule at write-time (spec.md §7): hour/minute
/// must be in range, and a weekly weekday must be `0..=6`.
pub fn validate_recurrence(recurrence: &RecurrenceSpec) -> Result<(), SchedulerError> {
    let (hour, minute) = match recurrence {
        RecurrenceSpec::Weekly { weekday, hour, minute } => {
            if *weekday > 6 {
                return Err(SchedulerError::InvalidRecurrence(format!(
                    "weekday {weekday} out of range 0..=6"
                )));
            }
            (*hour, *minute)
        }
        RecurrenceSpec::Monthly { day_of_month, hour, minute } => {
            if *day_of_month == 0 || *day_of_month > 31 {
                return Err(SchedulerError::InvalidRecurrence(format!(
                    "day_of_month {day_of_month} out of range 1..=31"
                )));
            }
            (*hour, *minute)
        }
    };
    if hour > 23 || minute > 59 {
        return Err(SchedulerError::InvalidRecurrence(format!("invalid clock time {hour}:{minute}")));
    }
    Ok(())
}
