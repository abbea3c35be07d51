//! pomoplan-core: Pomodoro study-plan scheduling.
//!
//! The scheduler is a pure function from a topic list to dated focus/break
//! sessions; the plan manager persists its output and replans while carrying
//! completion state forward.

pub mod cursor;
pub mod error;
pub mod plan;
pub mod reconcile;
pub mod schedule;
pub mod scheduler;
pub mod session;
pub mod task;
pub mod time;
pub mod topic;
pub mod view;

pub use cursor::TimeCursor;
pub use error::{PlanError, PlanResult};
pub use plan::{
    MemoryStore, PlanManager, PlanOutcome, PlanParams, PlanPolicy, PlanStore, PlanWarning,
    StudyPlan,
};
pub use reconcile::{ReconcileKey, reconcile, reconcile_with};
pub use schedule::Schedule;
pub use scheduler::{
    BudgetCheck, Scheduler, SchedulerConfig, daily_budget_minutes, generate_tasks,
};
pub use session::{ActiveSession, SessionSlot, format_countdown, owner_id};
pub use task::{LONG_BREAK_LABEL, SHORT_BREAK_LABEL, Task, TaskKind};
pub use time::{Clock, FixedClock, Preference, SystemClock, local_to_utc, parse_date};
pub use topic::{Topic, flatten};
pub use view::{DayProgress, DayView, day_views, next_pending, progress_on};
