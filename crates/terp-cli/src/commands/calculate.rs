//! `calculate-day`: compute and print one employee's `DailyValue`.

use chrono::NaiveDate;
use clap::Args;
use terp_core::domain::Booking;
use terp_core::{calculate_day, DailyInput};

use super::demo;

#[derive(Args)]
pub struct CalculateDayArgs {
    /// Employee identifier.
    #[arg(long)]
    pub employee: String,
    /// Target date, `YYYY-MM-DD`.
    #[arg(long)]
    pub date: String,
    /// Optional path to a JSON array of `Booking`s; defaults to a demo
    /// 08:00-16:30 work day.
    #[arg(long)]
    pub bookings_json: Option<String>,
}

pub fn run(args: CalculateDayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let date = NaiveDate::parse_from_str(&args.date, "%Y-%m-%d")?;

    let bookings: Vec<Booking> = match args.bookings_json {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => demo::default_bookings(&args.employee, date),
    };

    let booking_types = demo::booking_types();
    let plan = demo::day_plan();
    let assignment = demo::assignment(&args.employee, date);

    let input = DailyInput {
        employee_id: &args.employee,
        date,
        bookings: &bookings,
        booking_types: &booking_types,
        assignment: Some(&assignment),
        plan: Some(&plan),
        holiday: None,
        absence: None,
        coexisting_priority_zero_absence: false,
    };

    let daily_value = calculate_day(&input);
    println!("{}", serde_json::to_string_pretty(&daily_value)?);
    Ok(())
}
