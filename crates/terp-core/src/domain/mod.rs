//! Domain data model (spec.md §3).

pub mod booking;
pub mod daily_value;
pub mod day_plan;
pub mod holiday;
pub mod monthly_value;
pub mod task_schedule;
pub mod vacation;

pub use booking::{
    Booking, BookingCategory, BookingReason, BookingSource, BookingType, Direction, ReferenceTime,
};
pub use daily_value::{DailyStatus, DailyValue, ErrorCode, Warning};
pub use day_plan::{
    AssignmentSource, BreakRule, BreakRuleType, DayPlan, EmployeeDayPlan, HolidayCreditRule,
    RoundingPolicy, RoundingType, SurchargeConfig, Tolerance,
};
pub use holiday::{AbsenceDay, AbsenceDuration, AbsenceStatus, AbsenceType, Holiday};
pub use monthly_value::{FlextimeCarryoverPolicy, MonthlyValue};
pub use task_schedule::{
    ExecutionStatus, Macro, MacroActionType, MacroAssignment, MacroExecution, MacroRecurrenceKind,
    MacroTarget, RecurrenceSpec, ScheduledTask, TaskExecution, TaskType,
};
pub use vacation::VacationBalance;
