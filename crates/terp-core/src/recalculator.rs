//! Recalculation: compute the minimal dirty set, then drive daily and
//! monthly re-derivation across it (spec.md §4.8).
//!
//! Grounded on the detect-then-report shape of the teacher's
//! `scheduler::reconciliation::ReconciliationEngine`: a pure function
//! turns a source mutation into the affected keys; a thin async driver
//! (mirroring `scheduler::tick`'s select-then-dispatch loop) owns
//! persistence and re-derivation.

use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::daily_engine::{calculate_day, DailyInput};
use crate::domain::{
    AbsenceDay, AbsenceType, BookingType, DailyValue, FlextimeCarryoverPolicy, MonthlyValue,
};
use crate::events::{DomainEvent, EventBus};
use crate::monthly_engine::calculate_month;
use crate::repo::{
    AbsenceDayRepo, BookingRepo, DailyValueFilter, DailyValueRepo, EmployeeDayPlanRepo,
    HolidayRepo, MonthlyValueRepo, RepoResult,
};
use crate::scheduler::last_day_of_month;

/// A `(employee, date)` pair requiring daily re-derivation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirtyDay {
    pub employee_id: String,
    pub date: NaiveDate,
}

/// The source event driving a recalculation (spec.md §4.8).
#[derive(Debug, Clone)]
pub enum SourceMutation {
    BookingChanged { employee_id: String, date: NaiveDate },
    /// `range` is inclusive `[from, to]`; `working_days` names the dates
    /// within it that are actually scheduled work (absence on a
    /// non-working day does not dirty anything).
    AbsenceChanged { employee_id: String, working_days: Vec<NaiveDate> },
    /// Dates previously calculated for this tenant, already bounded to
    /// the current month ± the tenant's recalc window (spec.md §4.8:
    /// "never all history").
    HolidayChanged { affected: Vec<DirtyDay> },
    EmployeeDayPlanChanged { employee_id: String, dates: Vec<NaiveDate> },
    /// Assignments referencing the changed `DayPlan`, already bounded.
    DayPlanFieldsChanged { affected: Vec<DirtyDay> },
}

/// Compute the minimal `(employee, date)` set a mutation requires
/// re-deriving (spec.md §4.8). Pure and total: never fails, never
/// expands beyond what the mutation names.
pub fn dirty_days(mutation: &SourceMutation) -> BTreeSet<DirtyDay> {
    match mutation {
        SourceMutation::BookingChanged { employee_id, date } => {
            BTreeSet::from([DirtyDay { employee_id: employee_id.clone(), date: *date }])
        }
        SourceMutation::AbsenceChanged { employee_id, working_days } => working_days
            .iter()
            .map(|date| DirtyDay { employee_id: employee_id.clone(), date: *date })
            .collect(),
        SourceMutation::HolidayChanged { affected } => affected.iter().cloned().collect(),
        SourceMutation::EmployeeDayPlanChanged { employee_id, dates } => dates
            .iter()
            .map(|date| DirtyDay { employee_id: employee_id.clone(), date: *date })
            .collect(),
        SourceMutation::DayPlanFieldsChanged { affected } => affected.iter().cloned().collect(),
    }
}

/// Coalesce a set of dirty days into the `(employee, year, month)` keys
/// whose monthly aggregate must be recomputed once each, regardless of
/// how many days within it are dirty (spec.md §4.8).
pub fn dirty_months(days: &BTreeSet<DirtyDay>) -> BTreeSet<(String, i32, u32)> {
    use chrono::Datelike;
    days.iter().map(|d| (d.employee_id.clone(), d.date.year(), d.date.month())).collect()
}

/// Re-derive one dirty day: load its bookings/assignment/holiday/absence,
/// run §4.6, persist, and publish `DailyValueCalculated`. `booking_types`
/// and `absence_types` are tenant catalogs, not repository-backed (spec.md
/// §6 scopes the repository traits to what the dispatch/calculation paths
/// need; catalog lookup is the caller's concern, same as `terp-cli`'s
/// demo fixtures).
#[allow(clippy::too_many_arguments)]
pub async fn recalculate_day(
    tenant_id: &str,
    day: &DirtyDay,
    booking_repo: &dyn BookingRepo,
    assignment_repo: &dyn EmployeeDayPlanRepo,
    holiday_repo: &dyn HolidayRepo,
    absence_repo: &dyn AbsenceDayRepo,
    daily_value_repo: &dyn DailyValueRepo,
    booking_types: &HashMap<String, BookingType>,
    absence_types: &HashMap<String, AbsenceType>,
    bus: &EventBus,
) -> RepoResult<DailyValue> {
    let bookings =
        booking_repo.list_for_employee_date(tenant_id, &day.employee_id, day.date).await?;
    let assignment_and_plan =
        assignment_repo.get_for_employee_date(tenant_id, &day.employee_id, day.date).await?;
    let (assignment, plan) = match &assignment_and_plan {
        Some((a, p)) => (Some(a), p.as_ref()),
        None => (None, None),
    };
    let holiday = holiday_repo.get_by_date(tenant_id, day.date).await?;
    let absence_day = absence_repo.get_by_employee_date(&day.employee_id, day.date).await?;
    let absence: Option<(&AbsenceDay, &AbsenceType)> = absence_day
        .as_ref()
        .and_then(|ad| absence_types.get(&ad.type_code).map(|at| (ad, at)));
    let coexisting_priority_zero_absence =
        absence.is_some_and(|(_, at)| at.priority == 0) && holiday.is_some();

    let input = DailyInput {
        employee_id: &day.employee_id,
        date: day.date,
        bookings: &bookings,
        booking_types,
        assignment,
        plan,
        holiday: holiday.as_ref(),
        absence,
        coexisting_priority_zero_absence,
    };
    let value = calculate_day(&input);
    daily_value_repo.upsert(&value).await?;
    bus.publish(DomainEvent::DailyValueCalculated {
        employee_id: value.employee_id.clone(),
        date: value.date,
        has_error: value.has_error(),
        at: Utc::now(),
    });
    Ok(value)
}

/// Re-derive every day a mutation dirties, in the order `dirty_days`
/// reports them.
#[allow(clippy::too_many_arguments)]
pub async fn recalculate_days(
    tenant_id: &str,
    mutation: &SourceMutation,
    booking_repo: &dyn BookingRepo,
    assignment_repo: &dyn EmployeeDayPlanRepo,
    holiday_repo: &dyn HolidayRepo,
    absence_repo: &dyn AbsenceDayRepo,
    daily_value_repo: &dyn DailyValueRepo,
    booking_types: &HashMap<String, BookingType>,
    absence_types: &HashMap<String, AbsenceType>,
    bus: &EventBus,
) -> RepoResult<(BTreeSet<DirtyDay>, Vec<DailyValue>)> {
    let dirty = dirty_days(mutation);
    let mut values = Vec::with_capacity(dirty.len());
    for day in &dirty {
        let value = recalculate_day(
            tenant_id,
            day,
            booking_repo,
            assignment_repo,
            holiday_repo,
            absence_repo,
            daily_value_repo,
            booking_types,
            absence_types,
            bus,
        )
        .await?;
        values.push(value);
    }
    Ok((dirty, values))
}

/// Re-aggregate one dirty month: load the month's (already re-derived)
/// daily values, carry in the prior month's closed flextime balance, run
/// §4.7, persist, and publish `MonthlyValueCalculated`.
#[allow(clippy::too_many_arguments)]
pub async fn recalculate_month(
    tenant_id: &str,
    employee_id: &str,
    year: i32,
    month: u32,
    daily_value_repo: &dyn DailyValueRepo,
    monthly_value_repo: &dyn MonthlyValueRepo,
    flextime_cap_positive: Option<i32>,
    flextime_cap_negative: Option<i32>,
    carryover_policy: FlextimeCarryoverPolicy,
    monthly_credit_cap: Option<i32>,
    monthly_credit_threshold: Option<i32>,
    bus: &EventBus,
) -> RepoResult<MonthlyValue> {
    let from = NaiveDate::from_ymd_opt(year, month, 1).expect("valid calendar month");
    let to = NaiveDate::from_ymd_opt(year, month, last_day_of_month(year, month))
        .expect("valid calendar month");
    let filter = DailyValueFilter {
        employee_id: Some(employee_id.to_string()),
        from: Some(from),
        to: Some(to),
        has_errors: None,
    };
    let days = daily_value_repo.list(tenant_id, &filter).await?;

    let (prev_year, prev_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
    let prior = monthly_value_repo
        .list(employee_id, prev_year)
        .await?
        .into_iter()
        .find(|m| m.month == prev_month);
    // A closed prior month is exactly one month old at carry-in time
    // (Open Question (b), SPEC_FULL.md §2); absent one, there is nothing
    // to expire.
    let (opening_balance, opening_age) = match prior {
        Some(m) => (m.flextime_balance, 1),
        None => (0, 0),
    };

    let value = calculate_month(
        employee_id,
        year,
        month,
        &days,
        opening_balance,
        opening_age,
        flextime_cap_positive,
        flextime_cap_negative,
        carryover_policy,
        monthly_credit_cap,
        monthly_credit_threshold,
    );
    monthly_value_repo.upsert(&value).await?;
    bus.publish(DomainEvent::MonthlyValueCalculated {
        employee_id: value.employee_id.clone(),
        year: value.year,
        month: value.month,
        at: Utc::now(),
    });
    Ok(value)
}

/// Re-aggregate every month a dirty-day set touches, once each
/// (spec.md §4.8: "monthly re-aggregation is coalesced").
#[allow(clippy::too_many_arguments)]
pub async fn recalculate_months(
    tenant_id: &str,
    dirty: &BTreeSet<DirtyDay>,
    daily_value_repo: &dyn DailyValueRepo,
    monthly_value_repo: &dyn MonthlyValueRepo,
    flextime_cap_positive: Option<i32>,
    flextime_cap_negative: Option<i32>,
    carryover_policy: FlextimeCarryoverPolicy,
    monthly_credit_cap: Option<i32>,
    monthly_credit_threshold: Option<i32>,
    bus: &EventBus,
) -> RepoResult<Vec<MonthlyValue>> {
    let mut values = Vec::new();
    for (employee_id, year, month) in dirty_months(dirty) {
        let value = recalculate_month(
            tenant_id,
            &employee_id,
            year,
            month,
            daily_value_repo,
            monthly_value_repo,
            flextime_cap_positive,
            flextime_cap_negative,
            carryover_policy,
            monthly_credit_cap,
            monthly_credit_threshold,
            bus,
        )
        .await?;
        values.push(value);
    }
    Ok(values)
}

/// Approve a calculated, error-free day and publish `DailyValueApproved`
/// (spec.md §7). Returns `Ok(None)` if no `DailyValue` exists for
/// `(employee_id, date)`, and `Ok(Some(false))` if it exists but the
/// transition was refused (already approved, or still has open errors).
pub async fn approve_daily_value(
    tenant_id: &str,
    employee_id: &str,
    date: NaiveDate,
    approved_by: &str,
    daily_value_repo: &dyn DailyValueRepo,
    bus: &EventBus,
) -> RepoResult<Option<bool>> {
    let filter = DailyValueFilter {
        employee_id: Some(employee_id.to_string()),
        from: Some(date),
        to: Some(date),
        has_errors: None,
    };
    let Some(mut value) = daily_value_repo.list(tenant_id, &filter).await?.into_iter().next()
    else {
        return Ok(None);
    };
    if !value.approve() {
        return Ok(Some(false));
    }
    daily_value_repo.upsert(&value).await?;
    bus.publish(DomainEvent::DailyValueApproved {
        employee_id: value.employee_id,
        date: value.date,
        approved_by: approved_by.to_string(),
        at: Utc::now(),
    });
    Ok(Some(true))
}

/// Reject an approved day back to `calculated` and publish
/// `DailyValueRejected` (spec.md §7).
pub async fn reject_daily_value(
    tenant_id: &str,
    employee_id: &str,
    date: NaiveDate,
    rejected_by: &str,
    reason: Option<String>,
    daily_value_repo: &dyn DailyValueRepo,
    bus: &EventBus,
) -> RepoResult<Option<bool>> {
    let filter = DailyValueFilter {
        employee_id: Some(employee_id.to_string()),
        from: Some(date),
        to: Some(date),
        has_errors: None,
    };
    let Some(mut value) = daily_value_repo.list(tenant_id, &filter).await?.into_iter().next()
    else {
        return Ok(None);
    };
    if !value.reject() {
        return Ok(Some(false));
    }
    daily_value_repo.upsert(&value).await?;
    bus.publish(DomainEvent::DailyValueRejected {
        employee_id: value.employee_id,
        date: value.date,
        rejected_by: rejected_by.to_string(),
        reason,
        at: Utc::now(),
    });
    Ok(Some(true))
}

/// Approve a pending absence and publish `AbsenceApproved` (spec.md §4.8:
/// an approval is itself a mutation that dirties its working days).
/// Returns `false` without publishing if `day` was not `Pending`.
pub fn approve_absence(day: &mut AbsenceDay, bus: &EventBus) -> bool {
    if !day.approve() {
        return false;
    }
    bus.publish(DomainEvent::AbsenceApproved {
        absence_id: day.id.clone(),
        employee_id: day.employee_id.clone(),
        date: day.date,
        at: Utc::now(),
    });
    true
}

/// Reject a pending absence and publish `AbsenceRejected`.
pub fn reject_absence(day: &mut AbsenceDay, bus: &EventBus) -> bool {
    if !day.reject() {
        return false;
    }
    bus.publish(DomainEvent::AbsenceRejected {
        absence_id: day.id.clone(),
        employee_id: day.employee_id.clone(),
        date: day.date,
        at: Utc::now(),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn booking_change_dirties_exactly_one_day() {
        let mutation =
            SourceMutation::BookingChanged { employee_id: "e1".into(), date: date(2026, 8, 1) };
        let dirty = dirty_days(&mutation);
        assert_eq!(dirty.len(), 1);
        assert!(dirty.contains(&DirtyDay { employee_id: "e1".into(), date: date(2026, 8, 1) }));
    }

    #[test]
    fn absence_change_dirties_only_working_days() {
        let mutation = SourceMutation::AbsenceChanged {
            employee_id: "e1".into(),
            working_days: vec![date(2026, 8, 3), date(2026, 8, 4)],
        };
        let dirty = dirty_days(&mutation);
        assert_eq!(dirty.len(), 2);
    }

    #[test]
    fn minimal_recalc_one_write_per_employee() {
        let mutation =
            SourceMutation::BookingChanged { employee_id: "e1".into(), date: date(2026, 8, 1) };
        let dirty = dirty_days(&mutation);
        let months = dirty_months(&dirty);
        assert_eq!(dirty.len(), 1);
        assert_eq!(months.len(), 1);
    }

    #[test]
    fn multiple_dirty_days_same_month_coalesce_to_one_monthly_write() {
        let mutation = SourceMutation::EmployeeDayPlanChanged {
            employee_id: "e1".into(),
            dates: vec![date(2026, 8, 3), date(2026, 8, 17), date(2026, 8, 28)],
        };
        let dirty = dirty_days(&mutation);
        let months = dirty_months(&dirty);
        assert_eq!(dirty.len(), 3);
        assert_eq!(months.len(), 1);
        assert!(months.contains(&("e1".to_string(), 2026, 8)));
    }

    #[test]
    fn dirty_days_spanning_months_produce_two_monthly_writes() {
        let mutation = SourceMutation::EmployeeDayPlanChanged {
            employee_id: "e1".into(),
            dates: vec![date(2026, 8, 31), date(2026, 9, 1)],
        };
        let dirty = dirty_days(&mutation);
        let months = dirty_months(&dirty);
        assert_eq!(months.len(), 2);
    }

    #[test]
    fn holiday_change_uses_precomputed_bounded_set() {
        let affected = vec![
            DirtyDay { employee_id: "e1".into(), date: date(2026, 8, 1) },
            DirtyDay { employee_id: "e2".into(), date: date(2026, 8, 1) },
        ];
        let mutation = SourceMutation::HolidayChanged { affected: affected.clone() };
        let dirty = dirty_days(&mutation);
        assert_eq!(dirty, affected.into_iter().collect());
    }

    #[tokio::test]
    async fn recalculate_day_loads_inputs_persists_and_publishes() {
        use crate::storage::InMemoryStore;

        let store = InMemoryStore::new();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let day = DirtyDay { employee_id: "e1".into(), date: date(2026, 8, 3) };

        let value = recalculate_day(
            "ten1",
            &day,
            &store,
            &store,
            &store,
            &store,
            &store,
            &HashMap::new(),
            &HashMap::new(),
            &bus,
        )
        .await
        .unwrap();

        assert_eq!(value.employee_id, "e1");
        let stored = DailyValueRepo::list(&store, "ten1", &DailyValueFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        let published = rx.recv().await.unwrap();
        assert!(matches!(published, DomainEvent::DailyValueCalculated { .. }));
    }

    #[tokio::test]
    async fn recalculate_month_carries_prior_month_balance() {
        use crate::storage::InMemoryStore;

        let store = InMemoryStore::new();
        let bus = EventBus::default();
        let prior = MonthlyValue {
            employee_id: "e1".into(),
            year: 2026,
            month: 7,
            net_time: 0,
            target_time: 0,
            overtime: 0,
            undertime: 0,
            month_balance: 0,
            flextime_balance: 90,
            account_totals: Default::default(),
            warnings: vec![],
            calculated_at: Utc::now(),
        };
        MonthlyValueRepo::upsert(&store, &prior).await.unwrap();

        let month = recalculate_month(
            "ten1",
            "e1",
            2026,
            8,
            &store,
            &store,
            None,
            None,
            FlextimeCarryoverPolicy::Unlimited,
            None,
            None,
            &bus,
        )
        .await
        .unwrap();

        assert_eq!(month.flextime_balance, 90);
    }

    #[tokio::test]
    async fn approve_daily_value_transitions_persists_and_publishes() {
        use crate::storage::InMemoryStore;

        let store = InMemoryStore::new();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let day = DirtyDay { employee_id: "e1".into(), date: date(2026, 8, 3) };
        recalculate_day(
            "ten1",
            &day,
            &store,
            &store,
            &store,
            &store,
            &store,
            &HashMap::new(),
            &HashMap::new(),
            &bus,
        )
        .await
        .unwrap();
        assert!(matches!(rx.recv().await.unwrap(), DomainEvent::DailyValueCalculated { .. }));

        let outcome =
            approve_daily_value("ten1", "e1", date(2026, 8, 3), "admin1", &store, &bus)
                .await
                .unwrap();
        assert_eq!(outcome, Some(true));
        assert!(matches!(rx.recv().await.unwrap(), DomainEvent::DailyValueApproved { .. }));

        let filter = DailyValueFilter::default();
        let stored = DailyValueRepo::list(&store, "ten1", &filter).await.unwrap();
        assert_eq!(stored[0].status, crate::domain::DailyStatus::Approved);
    }

    #[tokio::test]
    async fn approve_daily_value_missing_day_returns_none() {
        use crate::storage::InMemoryStore;

        let store = InMemoryStore::new();
        let bus = EventBus::default();
        let outcome =
            approve_daily_value("ten1", "e1", date(2026, 8, 3), "admin1", &store, &bus)
                .await
                .unwrap();
        assert_eq!(outcome, None);
    }

    #[test]
    fn approve_absence_transitions_and_publishes() {
        let mut day = AbsenceDay {
            id: "a1".into(),
            employee_id: "e1".into(),
            date: date(2026, 8, 1),
            type_code: "VAC".into(),
            status: crate::domain::AbsenceStatus::Pending,
            duration: crate::domain::AbsenceDuration::Full,
            notes: None,
        };
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        assert!(approve_absence(&mut day, &bus));
        assert_eq!(day.status, crate::domain::AbsenceStatus::Approved);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn approve_absence_rejects_non_pending_transition() {
        let mut day = AbsenceDay {
            id: "a1".into(),
            employee_id: "e1".into(),
            date: date(2026, 8, 1),
            type_code: "VAC".into(),
            status: crate::domain::AbsenceStatus::Approved,
            duration: crate::domain::AbsenceDuration::Full,
            notes: None,
        };
        let bus = EventBus::default();
        assert!(!approve_absence(&mut day, &bus));
    }
}
