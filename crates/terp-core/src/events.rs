//! Domain events and the in-process bus that fans them out (spec.md §6).
//!
//! Adapted from the teacher's `events::Event`: same tagged-enum shape
//! (the GUI polled the teacher's variants; here subscribers are
//! recalculation triggers, audit logging, and notification delivery).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    DailyValueCalculated {
        employee_id: String,
        date: NaiveDate,
        has_error: bool,
        at: DateTime<Utc>,
    },
    MonthlyValueCalculated {
        employee_id: String,
        year: i32,
        month: u32,
        at: DateTime<Utc>,
    },
    DailyValueApproved {
        employee_id: String,
        date: NaiveDate,
        approved_by: String,
        at: DateTime<Utc>,
    },
    DailyValueRejected {
        employee_id: String,
        date: NaiveDate,
        rejected_by: String,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    AbsenceApproved {
        absence_id: String,
        employee_id: String,
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    AbsenceRejected {
        absence_id: String,
        employee_id: String,
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    HolidayChanged {
        tenant_id: String,
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    MacroExecutionCompleted {
        macro_assignment_id: String,
        at: DateTime<Utc>,
    },
    MacroExecutionFailed {
        macro_assignment_id: String,
        error_message: String,
        at: DateTime<Utc>,
    },
    TaskExecutionCompleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskExecutionFailed {
        task_id: String,
        error_message: String,
        at: DateTime<Utc>,
    },
}

/// Lossy, at-most-once-per-subscriber fanout: a slow subscriber drops
/// the oldest events rather than blocking publication (spec.md §6 names
/// no delivery guarantee beyond "subscribers observe the event").
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is not an error: recalculation, audit logging,
        // and notifications are all optional consumers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
