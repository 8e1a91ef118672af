//! SQLite-backed `ScheduleRepo`/`TaskExecutionRepo`/`MacroExecutionRepo`
//! (spec.md §6, §9: "at-most-once benefits from a real unique constraint").
//!
//! Same `rusqlite::Connection` + `migrate()` + `params!` shape as the
//! teacher's `storage::database::Database`, schema rewritten for
//! scheduled tasks and their executions instead of Pomodoro sessions.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;

use crate::domain::{
    ExecutionStatus, MacroExecution, RecurrenceSpec, ScheduledTask, TaskExecution, TaskType,
};
use crate::error::RepoError;
use crate::repo::{MacroExecutionRepo, RepoResult, ScheduleRepo, TaskExecutionRepo};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if absent) the database at `path`, running
    /// migrations before returning.
    pub fn open(path: &std::path::Path) -> Result<Self, RepoError> {
        let conn = Connection::open(path)
            .map_err(|source| RepoError::OpenFailed { path: path.to_path_buf(), source })?;
        let store = Self { conn: Mutex::new(conn) };
        store.migrate_sync()?;
        Ok(store)
    }

    /// In-memory database, primarily for tests.
    pub fn open_memory() -> Result<Self, RepoError> {
        let conn = Connection::open_in_memory().map_err(|source| RepoError::OpenFailed {
            path: std::path::PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn: Mutex::new(conn) };
        store.migrate_sync()?;
        Ok(store)
    }

    fn migrate_sync(&self) -> Result<(), RepoError> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS scheduled_tasks (
                id           TEXT PRIMARY KEY,
                tenant_id    TEXT NOT NULL,
                task_type    TEXT NOT NULL,
                recurrence   TEXT NOT NULL,
                parameters   TEXT NOT NULL,
                last_run_at  TEXT,
                next_run_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS task_executions (
                id            TEXT PRIMARY KEY,
                task_id       TEXT NOT NULL,
                status        TEXT NOT NULL,
                started_at    TEXT NOT NULL,
                completed_at  TEXT,
                result_json   TEXT,
                error_message TEXT
            );

            -- At most one in-flight execution per task (spec.md §5).
            CREATE UNIQUE INDEX IF NOT EXISTS idx_task_executions_running
                ON task_executions(task_id) WHERE status = 'running';

            CREATE TABLE IF NOT EXISTS macro_executions (
                id                   TEXT PRIMARY KEY,
                macro_assignment_id  TEXT NOT NULL,
                status               TEXT NOT NULL,
                started_at           TEXT NOT NULL,
                completed_at         TEXT,
                error_message        TEXT
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_macro_executions_running
                ON macro_executions(macro_assignment_id) WHERE status = 'running';

            CREATE INDEX IF NOT EXISTS idx_scheduled_tasks_next_run ON scheduled_tasks(next_run_at);",
        )
        .map_err(|e| RepoError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn status_str(status: ExecutionStatus) -> &'static str {
        match status {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }

    fn status_from_str(s: &str) -> Result<ExecutionStatus, RepoError> {
        match s {
            "pending" => Ok(ExecutionStatus::Pending),
            "running" => Ok(ExecutionStatus::Running),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            other => Err(RepoError::QueryFailed(format!("unknown execution status '{other}'"))),
        }
    }

    /// Administrative insert, outside `ScheduleRepo` (which only exposes
    /// what the dispatch loop itself needs: `select_due`/`update_next_run`).
    /// Used to seed a tenant's recurring tasks once at setup time.
    pub fn create_task(&self, task: &ScheduledTask) -> RepoResult<()> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "INSERT INTO scheduled_tasks (id, tenant_id, task_type, recurrence, parameters, last_run_at, next_run_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id,
                task.tenant_id,
                serde_json::to_value(task.task_type)
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?
                    .as_str()
                    .ok_or_else(|| RepoError::QueryFailed("task_type did not serialize to a string".into()))?,
                serde_json::to_string(&task.recurrence).map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                task.parameters.to_string(),
                task.last_run_at.map(|t| t.to_rfc3339()),
                task.next_run_at.to_rfc3339(),
            ],
        )
        .map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ScheduleRepo for SqliteStore {
    async fn select_due(&self, now: DateTime<Utc>) -> RepoResult<Vec<ScheduledTask>> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn
            .prepare(
                "SELECT id, tenant_id, task_type, recurrence, parameters, last_run_at, next_run_at
                 FROM scheduled_tasks WHERE next_run_at <= ?1",
            )
            .map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        let rows = stmt
            .query_map(params![now.to_rfc3339()], |row| {
                let task_type: String = row.get(2)?;
                let recurrence: String = row.get(3)?;
                let parameters: String = row.get(4)?;
                let last_run_at: Option<String> = row.get(5)?;
                let next_run_at: String = row.get(6)?;
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, task_type, recurrence, parameters, last_run_at, next_run_at))
            })
            .map_err(|e| RepoError::QueryFailed(e.to_string()))?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, tenant_id, task_type, recurrence, parameters, last_run_at, next_run_at) =
                row.map_err(|e| RepoError::QueryFailed(e.to_string()))?;
            tasks.push(ScheduledTask {
                id,
                tenant_id,
                task_type: serde_json::from_str::<TaskType>(&format!("\"{task_type}\""))
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                recurrence: serde_json::from_str::<RecurrenceSpec>(&recurrence)
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                parameters: serde_json::from_str(&parameters)
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                last_run_at: last_run_at
                    .map(|s| DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
                    .transpose()
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                next_run_at: DateTime::parse_from_rfc3339(&next_run_at)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
            });
        }
        Ok(tasks)
    }

    async fn update_next_run(&self, task_id: &str, next_run_at: DateTime<Utc>) -> RepoResult<()> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "UPDATE scheduled_tasks SET last_run_at = next_run_at, next_run_at = ?1 WHERE id = ?2",
            params![next_run_at.to_rfc3339(), task_id],
        )
        .map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TaskExecutionRepo for SqliteStore {
    async fn create_if_absent(&self, execution: &TaskExecution) -> RepoResult<bool> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let result = conn.execute(
            "INSERT INTO task_executions (id, task_id, status, started_at, completed_at, result_json, error_message)
             VALUES (?1, ?2, ?3, ?4, NULL, NULL, NULL)",
            params![
                execution.id,
                execution.task_id,
                Self::status_str(execution.status),
                execution.started_at.to_rfc3339(),
            ],
        );
        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
                Ok(false)
            }
            Err(e) => Err(RepoError::QueryFailed(e.to_string())),
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: ExecutionStatus,
        result_json: Option<serde_json::Value>,
        error_message: Option<String>,
    ) -> RepoResult<()> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "UPDATE task_executions SET status = ?1, completed_at = ?2, result_json = ?3, error_message = ?4 WHERE id = ?5",
            params![
                Self::status_str(status),
                Utc::now().to_rfc3339(),
                result_json.map(|v| v.to_string()),
                error_message,
                id,
            ],
        )
        .map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    async fn list_running(&self) -> RepoResult<Vec<TaskExecution>> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn
            .prepare(
                "SELECT id, task_id, status, started_at, completed_at, result_json, error_message
                 FROM task_executions WHERE status = 'running'",
            )
            .map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })
            .map_err(|e| RepoError::QueryFailed(e.to_string()))?;

        let mut executions = Vec::new();
        for row in rows {
            let (id, task_id, status, started_at, completed_at, result_json, error_message) =
                row.map_err(|e| RepoError::QueryFailed(e.to_string()))?;
            executions.push(TaskExecution {
                id,
                task_id,
                status: Self::status_from_str(&status)?,
                started_at: DateTime::parse_from_rfc3339(&started_at)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                completed_at: completed_at
                    .map(|s| DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
                    .transpose()
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                result_json: result_json
                    .map(|s| serde_json::from_str(&s))
                    .transpose()
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                error_message,
            });
        }
        Ok(executions)
    }
}

#[async_trait::async_trait]
impl MacroExecutionRepo for SqliteStore {
    async fn create_if_absent(&self, execution: &MacroExecution) -> RepoResult<bool> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let result = conn.execute(
            "INSERT INTO macro_executions (id, macro_assignment_id, status, started_at, completed_at, error_message)
             VALUES (?1, ?2, ?3, ?4, NULL, NULL)",
            params![
                execution.id,
                execution.macro_assignment_id,
                Self::status_str(execution.status),
                execution.started_at.to_rfc3339(),
            ],
        );
        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
                Ok(false)
            }
            Err(e) => Err(RepoError::QueryFailed(e.to_string())),
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: ExecutionStatus,
        error_message: Option<String>,
    ) -> RepoResult<()> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "UPDATE macro_executions SET status = ?1, completed_at = ?2, error_message = ?3 WHERE id = ?4",
            params![Self::status_str(status), Utc::now().to_rfc3339(), error_message, id],
        )
        .map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    async fn list_running(&self) -> RepoResult<Vec<MacroExecution>> {
        let conn = self.conn.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn
            .prepare(
                "SELECT id, macro_assignment_id, status, started_at, completed_at, error_message
                 FROM macro_executions WHERE status = 'running'",
            )
            .map_err(|e| RepoError::QueryFailed(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })
            .map_err(|e| RepoError::QueryFailed(e.to_string()))?;

        let mut executions = Vec::new();
        for row in rows {
            let (id, macro_assignment_id, status, started_at, completed_at, error_message) =
                row.map_err(|e| RepoError::QueryFailed(e.to_string()))?;
            executions.push(MacroExecution {
                id,
                macro_assignment_id,
                status: Self::status_from_str(&status)?,
                started_at: DateTime::parse_from_rfc3339(&started_at)
                    .map(|d| d.with_timezone(&Utc))
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                completed_at: completed_at
                    .map(|s| DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
                    .transpose()
                    .map_err(|e| RepoError::QueryFailed(e.to_string()))?,
                error_message,
            });
        }
        Ok(executions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecurrenceSpec;

    fn sample_task(id: &str, next_run_at: DateTime<Utc>) -> ScheduledTask {
        ScheduledTask {
            id: id.into(),
            tenant_id: "ten1".into(),
            task_type: TaskType::RecalculateDay,
            recurrence: RecurrenceSpec::Weekly { weekday: 0, hour: 9, minute: 0 },
            parameters: serde_json::json!({}),
            last_run_at: None,
            next_run_at,
        }
    }

    async fn seed_task(store: &SqliteStore, task: &ScheduledTask) {
        let conn = store.conn.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "INSERT INTO scheduled_tasks (id, tenant_id, task_type, recurrence, parameters, last_run_at, next_run_at)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)",
            params![
                task.id,
                task.tenant_id,
                serde_json::to_value(task.task_type).unwrap().as_str().unwrap(),
                serde_json::to_string(&task.recurrence).unwrap(),
                task.parameters.to_string(),
                task.next_run_at.to_rfc3339(),
            ],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn select_due_returns_only_past_due_tasks() {
        let store = SqliteStore::open_memory().unwrap();
        let now = Utc::now();
        seed_task(&store, &sample_task("t1", now - chrono::Duration::minutes(5))).await;
        seed_task(&store, &sample_task("t2", now + chrono::Duration::hours(1))).await;
        let due = store.select_due(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "t1");
    }

    #[tokio::test]
    async fn second_create_if_absent_for_same_task_is_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        let task = sample_task("t1", Utc::now());
        seed_task(&store, &task).await;
        let e1 = TaskExecution {
            id: "ex1".into(),
            task_id: "t1".into(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            result_json: None,
            error_message: None,
        };
        let e2 = TaskExecution { id: "ex2".into(), ..e1.clone() };
        assert!(TaskExecutionRepo::create_if_absent(&store, &e1).await.unwrap());
        assert!(!TaskExecutionRepo::create_if_absent(&store, &e2).await.unwrap());
    }

    #[tokio::test]
    async fn update_status_round_trips_through_list_running() {
        let store = SqliteStore::open_memory().unwrap();
        let task = sample_task("t1", Utc::now());
        seed_task(&store, &task).await;
        let execution = TaskExecution {
            id: "ex1".into(),
            task_id: "t1".into(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            result_json: None,
            error_message: None,
        };
        TaskExecutionRepo::create_if_absent(&store, &execution).await.unwrap();
        assert_eq!(TaskExecutionRepo::list_running(&store).await.unwrap().len(), 1);
        TaskExecutionRepo::update_status(&store, "ex1", ExecutionStatus::Completed, Some(serde_json::json!({"ok": true})), None)
            .await
            .unwrap();
        assert_eq!(TaskExecutionRepo::list_running(&store).await.unwrap().len(), 0);
    }
}
