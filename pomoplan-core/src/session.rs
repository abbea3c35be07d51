//! Active Pomodoro session.
//!
//! At most one session runs at a time. The slot is an explicit value owned by
//! the caller (persisted by the CLI), not process-global state.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::schedule::Schedule;
use crate::task::{Task, TaskKind};

/// Owner id for the task at `index` of a schedule, e.g. "2024-01-01#3".
pub fn owner_id(date: NaiveDate, index: usize) -> String {
    format!("{date}#{index}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub owner_id: String,
    pub task_index: usize,
    pub label: String,
    pub kind: TaskKind,
    pub duration_secs: i64,
    pub started_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn for_task(index: usize, task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            owner_id: owner_id(task.date, index),
            task_index: index,
            label: task.label.clone(),
            kind: task.kind,
            duration_secs: i64::from(task.duration_minutes) * 60,
            started_at: now,
        }
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(self.duration_secs)
    }

    /// Seconds left, clamped at zero.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.ends_at() - now).num_seconds().clamp(0, self.duration_secs)
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at()
    }

    /// Index of this session's task in `schedule`.
    ///
    /// The recorded index is used while it still holds the same task. After a
    /// replan has moved it, the first pending task with the same label and kind
    /// is used instead.
    pub fn locate(&self, schedule: &Schedule) -> Option<usize> {
        let same = |t: &Task| t.label == self.label && t.kind == self.kind;
        schedule
            .get(self.task_index)
            .filter(|t| same(t) && owner_id(t.date, self.task_index) == self.owner_id)
            .map(|_| self.task_index)
            .or_else(|| schedule.iter().position(|t| same(t) && !t.completed))
    }
}

/// "m:ss" countdown display.
pub fn format_countdown(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSlot {
    active: Option<ActiveSession>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    /// Claim the slot. Restarting the running owner keeps its original start.
    pub fn start(&mut self, session: ActiveSession) -> PlanResult<&ActiveSession> {
        if let Some(cur) = self
            .active
            .as_ref()
            .filter(|cur| cur.owner_id != session.owner_id)
        {
            return Err(PlanError::SessionBusy {
                active: cur.owner_id.clone(),
            });
        }
        Ok(self.active.get_or_insert(session))
    }

    /// Abandon the running session without completing it.
    pub fn stop(&mut self) -> PlanResult<ActiveSession> {
        self.active.take().ok_or(PlanError::NoActiveSession)
    }

    /// Release the slot only if its session has run out.
    pub fn take_finished(&mut self, now: DateTime<Utc>) -> Option<ActiveSession> {
        if self.active.as_ref().is_some_and(|s| s.is_finished(now)) {
            self.active.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Preference;
    use chrono::{NaiveTime, TimeZone};

    fn task(label: &str) -> Task {
        Task::focus(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            label,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            25,
            Preference::Morning,
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap()
    }

    #[test]
    fn single_writer() {
        let mut slot = SessionSlot::new();
        slot.start(ActiveSession::for_task(0, &task("Cells"), t0())).unwrap();

        let err = slot
            .start(ActiveSession::for_task(2, &task("DNA"), t0()))
            .unwrap_err();
        assert!(matches!(err, PlanError::SessionBusy { ref active } if active == "2024-01-01#0"));

        // same owner again: idempotent, keeps original start
        let later = t0() + Duration::minutes(5);
        let s = slot.start(ActiveSession::for_task(0, &task("Cells"), later)).unwrap();
        assert_eq!(s.started_at, t0());
    }

    #[test]
    fn countdown_and_finish() {
        let mut slot = SessionSlot::new();
        slot.start(ActiveSession::for_task(0, &task("Cells"), t0())).unwrap();

        let mid = t0() + Duration::seconds(10 * 60 + 5);
        let active = slot.active().unwrap();
        assert_eq!(active.remaining_secs(mid), 14 * 60 + 55);
        assert_eq!(format_countdown(active.remaining_secs(mid)), "14:55");
        assert!(slot.take_finished(mid).is_none());

        let done = t0() + Duration::minutes(25);
        assert_eq!(slot.active().unwrap().remaining_secs(done), 0);
        assert!(slot.take_finished(done).is_some());
        assert!(slot.active().is_none());
        assert!(matches!(slot.stop(), Err(PlanError::NoActiveSession)));
    }

    #[test]
    fn locate_follows_moved_task() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let at = |label: &str, hour: u32| {
            let start = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
            Task::focus(d, label, start, 25, Preference::Morning)
        };
        let before = Schedule::new(vec![at("Cells", 8), at("Genetics", 9)]);
        let session = ActiveSession::for_task(0, &before.tasks()[0], t0());
        assert_eq!(session.locate(&before), Some(0));

        let moved = Schedule::new(vec![at("Genetics", 8), at("Cells", 9)]);
        assert_eq!(session.locate(&moved), Some(1));

        let gone = Schedule::new(vec![at("Genetics", 8)]);
        assert_eq!(session.locate(&gone), None);
    }
}
