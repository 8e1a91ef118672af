//! Macro dispatch for one calendar date (spec.md §4.9).
//!
//! Grounded on the teacher's `RecipeEngine::evaluate_event`: load the
//! active definitions, match each against "now" (here a dispatch date
//! rather than a runtime event), run the matching action.

use chrono::{Datelike, NaiveDate, Utc};

use crate::domain::{Macro, MacroAssignment, MacroRecurrenceKind};
use crate::events::{DomainEvent, EventBus};
use crate::macros::action::{ActionContext, ActionRegistry};
use crate::scheduler::last_day_of_month;

/// Whether `assignment.execution_day` fires on `date`, honoring the
/// monthly clamp-to-last-day rule shared with `scheduler::next_run_after`.
pub fn assignment_due(recurrence_kind: MacroRecurrenceKind, assignment: &MacroAssignment, date: NaiveDate) -> bool {
    match recurrence_kind {
        MacroRecurrenceKind::Weekly => date.weekday().num_days_from_sunday() as u8 == assignment.execution_day,
        MacroRecurrenceKind::Monthly => {
            let clamped = (assignment.execution_day as u32).min(last_day_of_month(date.year(), date.month()));
            date.day() == clamped
        }
    }
}

/// The outcome of dispatching one `(macro, assignment)` pair.
pub struct DispatchOutcome {
    pub assignment_id: String,
    pub result: Result<serde_json::Value, String>,
}

/// Run every due assignment for `date` through the registry, publishing
/// `MacroExecutionCompleted`/`MacroExecutionFailed` per outcome. Deterministic
/// given its inputs aside from the publish side effect; the caller still
/// persists a `MacroExecution` per outcome.
pub fn run_due(
    definitions: &[(Macro, Vec<MacroAssignment>)],
    registry: &ActionRegistry,
    date: NaiveDate,
    bus: &EventBus,
) -> Vec<DispatchOutcome> {
    let mut outcomes = Vec::new();
    for (macro_def, assignments) in definitions {
        let Some(executor) = registry.get(macro_def.action_type.action_code()) else {
            for assignment in assignments {
                let error_message = format!("no executor for '{}'", macro_def.action_type.action_code());
                bus.publish(DomainEvent::MacroExecutionFailed {
                    macro_assignment_id: assignment.id.clone(),
                    error_message: error_message.clone(),
                    at: Utc::now(),
                });
                outcomes.push(DispatchOutcome { assignment_id: assignment.id.clone(), result: Err(error_message) });
            }
            continue;
        };
        for assignment in assignments {
            if !assignment_due(macro_def.recurrence_kind, assignment, date) {
                continue;
            }
            let ctx = ActionContext { macro_def, assignment, dispatch_date: date };
            let result = executor.run(&ctx);
            match &result {
                Ok(_) => bus.publish(DomainEvent::MacroExecutionCompleted {
                    macro_assignment_id: assignment.id.clone(),
                    at: Utc::now(),
                }),
                Err(error_message) => bus.publish(DomainEvent::MacroExecutionFailed {
                    macro_assignment_id: assignment.id.clone(),
                    error_message: error_message.clone(),
                    at: Utc::now(),
                }),
            }
            outcomes.push(DispatchOutcome { assignment_id: assignment.id.clone(), result });
        }
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MacroActionType, MacroTarget};

    fn weekly_macro() -> Macro {
        Macro {
            id: "m1".into(),
            tenant_id: "ten1".into(),
            name: "weekly log".into(),
            recurrence_kind: MacroRecurrenceKind::Weekly,
            action_type: MacroActionType::LogMessage,
            params: serde_json::json!({}),
        }
    }

    fn assignment(day: u8) -> MacroAssignment {
        MacroAssignment {
            id: "a1".into(),
            macro_id: "m1".into(),
            target: MacroTarget::Employee { employee_id: "e1".into() },
            execution_day: day,
        }
    }

    #[test]
    fn weekly_assignment_fires_only_on_matching_weekday() {
        // 2026-08-03 is a Monday (weekday 1, Sunday=0 per spec.md §4.9).
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert!(assignment_due(MacroRecurrenceKind::Weekly, &assignment(1), date));
        assert!(!assignment_due(MacroRecurrenceKind::Weekly, &assignment(2), date));
    }

    #[test]
    fn monthly_assignment_clamps_to_last_day() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert!(assignment_due(MacroRecurrenceKind::Monthly, &assignment(31), date));
    }

    #[test]
    fn run_due_dispatches_only_matching_assignments() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let definitions = vec![(weekly_macro(), vec![assignment(1), assignment(2)])];
        let registry = ActionRegistry::new();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let outcomes = run_due(&definitions, &registry, date, &bus);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].assignment_id, "a1");
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(rx.try_recv().unwrap(), DomainEvent::MacroExecutionCompleted { .. }));
    }

    #[test]
    fn run_due_reports_missing_executor() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let mut m = weekly_macro();
        m.action_type = MacroActionType::ResetFlextime;
        let definitions = vec![(m, vec![assignment(1)])];
        let registry = ActionRegistry::new();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let outcomes = run_due(&definitions, &registry, date, &bus);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.is_err());
        assert!(matches!(rx.try_recv().unwrap(), DomainEvent::MacroExecutionFailed { .. }));
    }
}
