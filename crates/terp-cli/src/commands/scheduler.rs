//! `scheduler`: seed a demo recurring task, tick the dispatch loop, and
//! inspect in-flight executions (spec.md §4.9).

use chrono::Utc;
use clap::Subcommand;
use terp_core::domain::{RecurrenceSpec, ScheduledTask, TaskExecution, TaskType};
use terp_core::repo::TaskExecutionRepo;
use terp_core::{tick, EventBus, SqliteStore, TaskExecutor};

use super::demo::TENANT_ID;

#[derive(Subcommand)]
pub enum SchedulerAction {
    /// Create the demo tenant's weekly recalculation task if it does not exist.
    Seed,
    /// Run one dispatch tick against all due tasks.
    Tick,
    /// List executions currently in the `running` state.
    Inspect,
}

const DEMO_TASK_ID: &str = "demo-weekly-recalc";

struct LoggingExecutor;

#[async_trait::async_trait]
impl TaskExecutor for LoggingExecutor {
    async fn execute(&self, task: &ScheduledTask) -> Result<serde_json::Value, String> {
        Ok(serde_json::json!({ "dispatched_task_id": task.id, "task_type": task.task_type }))
    }
}

fn store_path() -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    Ok(terp_core::config_dir()?.join("terp.db"))
}

pub fn run(action: SchedulerAction) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { run_async(action).await })
}

async fn run_async(action: SchedulerAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open(&store_path()?)?;

    match action {
        SchedulerAction::Seed => {
            let task = ScheduledTask {
                id: DEMO_TASK_ID.to_string(),
                tenant_id: TENANT_ID.to_string(),
                task_type: TaskType::RecalculateDay,
                recurrence: RecurrenceSpec::Weekly { weekday: 1, hour: 2, minute: 0 },
                parameters: serde_json::json!({}),
                last_run_at: None,
                next_run_at: Utc::now(),
            };
            store.create_task(&task)?;
            println!("seeded task {DEMO_TASK_ID}");
        }
        SchedulerAction::Tick => {
            let executor = LoggingExecutor;
            let bus = EventBus::default();
            let dispatched = tick(&store, &store, &executor, &bus, Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&dispatched)?);
        }
        SchedulerAction::Inspect => {
            let running: Vec<TaskExecution> = TaskExecutionRepo::list_running(&store).await?;
            println!("{}", serde_json::to_string_pretty(&running)?);
        }
    }
    Ok(())
}
