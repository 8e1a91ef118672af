//! Holidays and absences (spec.md §3).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tenant-wide holiday. Categories order credit treatment: 1 = full
/// paid, 2 = partial, 3 = observed/no credit, as configured per tenant
/// via `DayPlan::holiday_credit` (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub tenant_id: String,
    pub date: NaiveDate,
    pub name: String,
    pub category: u8,
}

/// A configured kind of absence (vacation, sick leave, ...).
/// `priority > 0` means the absence overrides holiday credit on overlap;
/// `priority == 0` means holiday wins (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceType {
    pub code: String,
    pub holiday_code: Option<String>,
    pub priority: u32,
    /// Fraction of the target day credited, in `(0, 1]`.
    pub portion: f64,
    pub vacation_deduction: bool,
}

/// How much of a day an absence covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceDuration {
    Full,
    HalfAm,
    HalfPm,
}

impl AbsenceDuration {
    /// Fraction of a full day this duration represents, combined
    /// multiplicatively with `AbsenceType::portion` in the holiday/
    /// absence resolver (spec.md §4.5).
    pub fn factor(self) -> f64 {
        match self {
            AbsenceDuration::Full => 1.0,
            AbsenceDuration::HalfAm | AbsenceDuration::HalfPm => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A requested or approved absence for one employee/date. At most one
/// non-cancelled absence exists per `(employee, date)` (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceDay {
    pub id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub type_code: String,
    pub status: AbsenceStatus,
    pub duration: AbsenceDuration,
    pub notes: Option<String>,
}

impl AbsenceDay {
    pub fn is_cancelled(&self) -> bool {
        self.status == AbsenceStatus::Cancelled
    }

    /// Whether this absence is eligible to be considered by the resolver
    /// at all — rejected/cancelled are ignored entirely (spec.md §4.5).
    pub fn is_live(&self) -> bool {
        matches!(self.status, AbsenceStatus::Pending | AbsenceStatus::Approved)
    }

    /// `pending -> approved`. Returns `false`, leaving `self` unchanged,
    /// if not currently pending.
    pub fn approve(&mut self) -> bool {
        if self.status != AbsenceStatus::Pending {
            return false;
        }
        self.status = AbsenceStatus::Approved;
        true
    }

    /// `pending -> rejected`. Returns `false`, leaving `self` unchanged,
    /// if not currently pending.
    pub fn reject(&mut self) -> bool {
        if self.status != AbsenceStatus::Pending {
            return false;
        }
        self.status = AbsenceStatus::Rejected;
        true
    }
}
