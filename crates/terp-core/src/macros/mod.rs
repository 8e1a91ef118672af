//! Macro action registry and per-date dispatch (spec.md §4.9, §9).

pub mod action;
pub mod engine;

pub use action::{ActionContext, ActionExecutor, ActionRegistry};
pub use engine::{assignment_due, run_due, DispatchOutcome};
