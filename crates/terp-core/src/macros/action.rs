//! Macro action registry (spec.md §4.9, §9).
//!
//! Grounded on the teacher's `recipes::Action`: a tagged enum naming
//! what can happen, paired here with a registry of executors keyed by
//! `action_code()` rather than the teacher's single hardcoded variant.

use std::collections::HashMap;

use crate::domain::{Macro, MacroActionType, MacroAssignment};

/// Context an action executor needs to act on one `(macro, assignment)`
/// pair for one dispatch date.
pub struct ActionContext<'a> {
    pub macro_def: &'a Macro,
    pub assignment: &'a MacroAssignment,
    pub dispatch_date: chrono::NaiveDate,
}

/// One registered action body. Returns a free-form result payload or an
/// error message, mirroring `scheduler::TaskExecutor`.
pub trait ActionExecutor: Send + Sync {
    fn run(&self, ctx: &ActionContext<'_>) -> Result<serde_json::Value, String>;
}

/// `log_message`: always succeeds, records that the macro fired. Useful
/// as a no-op default and for tests.
pub struct LogMessageExecutor;

impl ActionExecutor for LogMessageExecutor {
    fn run(&self, ctx: &ActionContext<'_>) -> Result<serde_json::Value, String> {
        Ok(serde_json::json!({
            "message": format!("macro '{}' fired for {}", ctx.macro_def.name, ctx.dispatch_date),
        }))
    }
}

/// Maps `action_code()` to its executor (spec.md §9). Built-ins are
/// registered by default; callers may override or add entries.
pub struct ActionRegistry {
    executors: HashMap<&'static str, Box<dyn ActionExecutor>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        let mut executors: HashMap<&'static str, Box<dyn ActionExecutor>> = HashMap::new();
        executors.insert(MacroActionType::LogMessage.action_code(), Box::new(LogMessageExecutor));
        Self { executors }
    }

    pub fn register(&mut self, code: &'static str, executor: Box<dyn ActionExecutor>) {
        self.executors.insert(code, executor);
    }

    pub fn get(&self, code: &str) -> Option<&dyn ActionExecutor> {
        self.executors.get(code).map(|b| b.as_ref())
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
