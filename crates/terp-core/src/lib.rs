//! # Terp core
//!
//! Time-tracking calculation core for a multi-tenant workforce management
//! system: booking pairing and rounding, break and surcharge engines,
//! holiday/absence resolution, daily/monthly aggregation, recalculation,
//! and the scheduler/macro dispatch loop that drives them.
//!
//! ## Architecture
//!
//! - **Engines** (`pairing`, `rounding`, `break_engine`, `surcharge`,
//!   `holiday_absence`, `daily_engine`, `monthly_engine`): pure functions
//!   from input to a computed value, never `Result` — failure is
//!   expressed as error codes on the value itself (spec.md §4, §7).
//! - **Recalculator**: derives which days/months are dirty after a
//!   source mutation (spec.md §4.8).
//! - **Repo**: the abstract persistence boundary, with `storage::memory`
//!   and `storage::sqlite` as the two implementations.
//! - **Scheduler/macros**: recurring task dispatch and the per-tenant
//!   macro action registry, both enforcing at-most-once execution.
//! - **Catalog**: tenant-scoped error/warning message overrides.
//! - **Events**: an in-process bus carrying `DomainEvent`s to whatever
//!   subscribes (recalculation triggers, audit logging, notifications).

pub mod break_engine;
pub mod catalog;
pub mod daily_engine;
pub mod domain;
pub mod error;
pub mod events;
pub mod holiday_absence;
pub mod macros;
pub mod monthly_engine;
pub mod pairing;
pub mod recalculator;
pub mod repo;
pub mod rounding;
pub mod scheduler;
pub mod storage;
pub mod surcharge;
pub mod time;

pub use break_engine::{apply_net_clamp, calculate_break, BreakResult};
pub use catalog::{CatalogOverrides, MessageCatalog};
pub use daily_engine::{calculate_day, DailyInput};
pub use error::{ConfigError, CoreError, RepoError, SchedulerError, ValidationError};
pub use events::{DomainEvent, EventBus};
pub use holiday_absence::{resolve, Resolution};
pub use macros::{assignment_due, run_due, ActionContext, ActionExecutor, ActionRegistry, DispatchOutcome};
pub use monthly_engine::{apply_carryover_expiry, calculate_month};
pub use pairing::{pair_bookings, BookingPair, PairingResult, PairingWarning};
pub use recalculator::{
    approve_absence, approve_daily_value, dirty_days, dirty_months, reject_absence,
    reject_daily_value, recalculate_day, recalculate_days, recalculate_month, recalculate_months,
    DirtyDay, SourceMutation,
};
pub use repo::{
    AbsenceDayRepo, AuditLogRepo, BookingRepo, DailyValueFilter, DailyValueRepo,
    EmployeeDayPlanRepo, HolidayRepo, MacroExecutionRepo, MacroRepo, MonthlyValueRepo, RepoResult,
    ScheduleRepo, TaskExecutionRepo, VacationBalanceRepo,
};
pub use rounding::calculate_time;
pub use scheduler::{next_run_after, select_due, tick, validate_recurrence, TaskExecutor};
pub use storage::{config_dir, InMemoryStore, SchedulerConfig, SqliteStore, TenantConfig};
pub use surcharge::{calculate_surcharges, SurchargeEntry, SurchargeResult};
