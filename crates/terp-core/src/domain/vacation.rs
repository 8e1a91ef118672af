//! Vacation balance ledger (spec.md §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationBalance {
    pub employee_id: String,
    pub year: i32,
    pub base: f64,
    pub additional: f64,
    pub carryover_in: f64,
    pub manual_adjustment: f64,
    pub carryover_out: Option<f64>,
    pub used: f64,
    pub planned: f64,
}

impl VacationBalance {
    pub fn remaining(&self) -> f64 {
        self.base + self.additional + self.carryover_in + self.manual_adjustment
            - self.used
            - self.planned
    }
}
