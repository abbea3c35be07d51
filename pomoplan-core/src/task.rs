//! Task model: the unit of schedule output.
//!
//! Kept small and serializable; the JSON shape is what the plan store persists
//! and what the planner page renders.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::time::{Preference, format_wall_clock, wall_clock};

pub const SHORT_BREAK_LABEL: &str = "Short Break ☕";
pub const LONG_BREAK_LABEL: &str = "Long Break 🧘";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Focus,
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Calendar day, serialized as YYYY-MM-DD.
    pub date: NaiveDate,

    /// Topic/subtopic text for focus tasks, break text for breaks.
    /// Also the reconciliation key across replans.
    #[serde(alias = "topic")]
    pub label: String,

    #[serde(alias = "type")]
    pub kind: TaskKind,

    /// Minutes.
    #[serde(alias = "duration")]
    pub duration_minutes: u32,

    #[serde(with = "wall_clock")]
    pub start_time: NaiveTime,

    #[serde(with = "wall_clock")]
    pub end_time: NaiveTime,

    #[serde(default)]
    pub completed: bool,

    pub preference: Preference,
}

impl Task {
    pub fn focus(
        date: NaiveDate,
        label: impl Into<String>,
        start: NaiveTime,
        minutes: u32,
        preference: Preference,
    ) -> Self {
        Self::new(date, label, TaskKind::Focus, start, minutes, preference)
    }

    pub fn rest(
        date: NaiveDate,
        long: bool,
        start: NaiveTime,
        minutes: u32,
        preference: Preference,
    ) -> Self {
        let label = if long { LONG_BREAK_LABEL } else { SHORT_BREAK_LABEL };
        Self::new(date, label, TaskKind::Break, start, minutes, preference)
    }

    fn new(
        date: NaiveDate,
        label: impl Into<String>,
        kind: TaskKind,
        start: NaiveTime,
        minutes: u32,
        preference: Preference,
    ) -> Self {
        // NaiveTime addition wraps at midnight, same as a wall clock.
        let end = start + chrono::Duration::minutes(i64::from(minutes));
        Self {
            date,
            label: label.into(),
            kind,
            duration_minutes: minutes,
            start_time: start,
            end_time: end,
            completed: false,
            preference,
        }
    }

    pub fn is_focus(&self) -> bool {
        self.kind == TaskKind::Focus
    }

    pub fn is_break(&self) -> bool {
        self.kind == TaskKind::Break
    }

    pub fn is_long_break(&self) -> bool {
        self.is_break() && self.label == LONG_BREAK_LABEL
    }

    pub fn start_display(&self) -> String {
        format_wall_clock(self.start_time)
    }

    pub fn end_display(&self) -> String {
        format_wall_clock(self.end_time)
    }
}
