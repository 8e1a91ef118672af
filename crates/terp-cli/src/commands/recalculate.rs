//! `recalculate`: drive a bounded re-derivation across the daily and
//! monthly layers for the minimal set a booking change dirties
//! (spec.md §4.8). Runs against a freshly-seeded in-memory store, the
//! same demo fixtures `calculate-day` uses — there is no ingestion
//! command to have populated a durable store first (demo's Non-goal:
//! no HTTP surface, spec.md §1).

use std::collections::HashMap;

use chrono::NaiveDate;
use clap::Args;
use terp_core::domain::FlextimeCarryoverPolicy;
use terp_core::{
    dirty_days, dirty_months, recalculate_day, recalculate_month, EventBus, InMemoryStore,
    SourceMutation,
};

use super::demo::{self, TENANT_ID};

#[derive(Args)]
pub struct RecalculateArgs {
    /// Employee identifier.
    #[arg(long)]
    pub employee: String,
    /// Date of the changed booking, `YYYY-MM-DD`.
    #[arg(long)]
    pub date: String,
}

pub fn run(args: RecalculateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { run_async(args).await })
}

async fn run_async(args: RecalculateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = NaiveDate::parse_from_str(&args.date, "%Y-%m-%d")?;
    let mutation = SourceMutation::BookingChanged { employee_id: args.employee.clone(), date };
    let dirty = dirty_days(&mutation);
    let months = dirty_months(&dirty);

    let store = InMemoryStore::new();
    store.seed_day_plan(demo::day_plan());
    for day in &dirty {
        store.seed_assignment(demo::assignment(&day.employee_id, day.date));
        for booking in demo::default_bookings(&day.employee_id, day.date) {
            terp_core::BookingRepo::create(&store, &booking).await?;
        }
    }

    let bus = EventBus::default();
    let booking_types = demo::booking_types();
    let absence_types = HashMap::new();

    let mut recalculated_days = Vec::new();
    for day in &dirty {
        let value = recalculate_day(
            TENANT_ID,
            day,
            &store,
            &store,
            &store,
            &store,
            &store,
            &booking_types,
            &absence_types,
            &bus,
        )
        .await?;
        recalculated_days.push(value);
    }

    let mut recalculated_months = Vec::new();
    for (employee_id, year, month) in &months {
        let value = recalculate_month(
            TENANT_ID,
            employee_id,
            *year,
            *month,
            &store,
            &store,
            None,
            None,
            FlextimeCarryoverPolicy::Unlimited,
            None,
            None,
            &bus,
        )
        .await?;
        recalculated_months.push(value);
    }

    let report = serde_json::json!({
        "dirty_days": dirty,
        "dirty_months": months.iter().map(|(employee_id, year, month)| {
            serde_json::json!({ "employee_id": employee_id, "year": year, "month": month })
        }).collect::<Vec<_>>(),
        "recalculated_days": recalculated_days,
        "recalculated_months": recalculated_months,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
