//! Scheduler: topics -> dated focus/break sessions.
//!
//! Day-rollover bin packing with fixed-size items:
//! - every flattened item becomes a focus session followed by a break
//! - a pair is never split across days; if it would not fit today's budget
//!   the cursor rolls to the next day first
//! - every 4th session of a day gets a long break
//!
//! Pure: no I/O, no clock reads, no mutation of inputs.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cursor::TimeCursor;
use crate::error::{PlanError, PlanResult};
use crate::schedule::Schedule;
use crate::task::Task;
use crate::time::Preference;
use crate::topic::{Topic, flatten};

/// Which break length the rollover look-ahead assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCheck {
    /// Always reserve focus + short break, even before a long break.
    /// Matches schedules produced by earlier releases.
    #[default]
    ShortBreak,
    /// Reserve focus + the break that will actually follow.
    UpcomingBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    /// Long break after every N-th session of a day.
    pub long_break_every: u32,
    pub morning_start_hour: u32,
    pub afternoon_start_hour: u32,
    pub budget_check: BudgetCheck,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 20,
            long_break_every: 4,
            morning_start_hour: 8,
            afternoon_start_hour: 14,
            budget_check: BudgetCheck::ShortBreak,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> PlanResult<()> {
        if self.focus_minutes == 0 {
            return Err(PlanError::invalid("focus_minutes must be positive"));
        }
        if self.long_break_every == 0 {
            return Err(PlanError::invalid("long_break_every must be positive"));
        }
        for h in [self.morning_start_hour, self.afternoon_start_hour] {
            if h > 23 {
                return Err(PlanError::invalid(format!("start hour {h} must be 0-23")));
            }
        }
        Ok(())
    }

    pub fn day_start(&self, preference: Preference) -> NaiveTime {
        let hour = match preference {
            Preference::Morning => self.morning_start_hour,
            Preference::Afternoon => self.afternoon_start_hour,
        };
        NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Break length following the `session`-th (1-based) focus session of a day.
    pub fn break_after(&self, session: u32) -> (bool, u32) {
        if session % self.long_break_every == 0 {
            (true, self.long_break_minutes)
        } else {
            (false, self.short_break_minutes)
        }
    }

    fn look_ahead_cost(&self, cursor: &TimeCursor) -> u32 {
        let break_minutes = match self.budget_check {
            BudgetCheck::ShortBreak => self.short_break_minutes,
            BudgetCheck::UpcomingBreak => self.break_after(cursor.sessions_today() + 1).1,
        };
        self.focus_minutes + break_minutes
    }
}

/// Convert study hours to a whole-minute daily budget.
///
/// Minutes used are always whole, so flooring keeps `used + cost > hours * 60`
/// exact for fractional budgets.
pub fn daily_budget_minutes(study_hours_per_day: f64) -> PlanResult<u32> {
    if !study_hours_per_day.is_finite() || study_hours_per_day <= 0.0 {
        return Err(PlanError::invalid(format!(
            "study_hours_per_day must be positive, got {study_hours_per_day}"
        )));
    }
    let minutes = (study_hours_per_day * 60.0).floor();
    if minutes < 1.0 || minutes > f64::from(24 * 60) {
        return Err(PlanError::invalid(format!(
            "study_hours_per_day out of range: {study_hours_per_day}"
        )));
    }
    Ok(minutes as u32)
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> PlanResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Lay out `topics` starting on `today`.
    ///
    /// `exam_date` is accepted for the caller's benefit only; whether the
    /// result finishes in time is checked by the plan manager.
    pub fn generate(
        &self,
        topics: &[Topic],
        exam_date: NaiveDate,
        study_hours_per_day: f64,
        preference: Preference,
        today: NaiveDate,
    ) -> PlanResult<Schedule> {
        let budget = daily_budget_minutes(study_hours_per_day)?;
        let cfg = &self.config;
        let items = flatten(topics);

        let mut cursor = TimeCursor::new(today, cfg.day_start(preference));
        let mut tasks = Vec::with_capacity(items.len() * 2);

        for label in items {
            if cursor.would_exceed(cfg.look_ahead_cost(&cursor), budget) {
                debug!(
                    date = %cursor.date(),
                    used = cursor.minutes_used(),
                    budget,
                    "daily budget reached, rolling over"
                );
                cursor.roll_over();
            }

            let (start, _) = cursor.advance(cfg.focus_minutes);
            tasks.push(Task::focus(
                cursor.date(),
                label,
                start,
                cfg.focus_minutes,
                preference,
            ));

            let session = cursor.record_session();
            let (long, minutes) = cfg.break_after(session);
            let (start, _) = cursor.advance(minutes);
            tasks.push(Task::rest(cursor.date(), long, start, minutes, preference));
        }

        let schedule = Schedule::new(tasks);
        info!(
            tasks = schedule.len(),
            first = ?schedule.first_date(),
            last = ?schedule.last_date(),
            %exam_date,
            "generated study schedule"
        );
        Ok(schedule)
    }
}

/// Generate a schedule with the default Pomodoro cadence.
pub fn generate_tasks(
    topics: &[Topic],
    exam_date: NaiveDate,
    study_hours_per_day: f64,
    preference: Preference,
    today: NaiveDate,
) -> PlanResult<Schedule> {
    Scheduler::default().generate(topics, exam_date, study_hours_per_day, preference, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{LONG_BREAK_LABEL, SHORT_BREAK_LABEL, TaskKind};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn many(n: usize) -> Vec<Topic> {
        (0..n).map(|i| Topic::new(format!("T{i}"))).collect()
    }

    #[test]
    fn cells_genetics_example() {
        let topics = vec![
            Topic::new("Cells"),
            Topic::new("Genetics").with_subtopics(["DNA", "RNA"]),
        ];
        let s = generate_tasks(&topics, d(11), 1.0, Preference::Morning, d(1)).unwrap();
        let got: Vec<(String, &str, String, String)> = s
            .iter()
            .map(|t| {
                (
                    t.date.to_string(),
                    t.label.as_str(),
                    t.start_display(),
                    t.end_display(),
                )
            })
            .collect();
        let want = vec![
            ("2024-01-01", "Cells", "08:00 AM", "08:25 AM"),
            ("2024-01-01", SHORT_BREAK_LABEL, "08:25 AM", "08:30 AM"),
            ("2024-01-01", "Genetics: DNA", "08:30 AM", "08:55 AM"),
            ("2024-01-01", SHORT_BREAK_LABEL, "08:55 AM", "09:00 AM"),
            ("2024-01-02", "RNA", "08:00 AM", "08:25 AM"),
            ("2024-01-02", SHORT_BREAK_LABEL, "08:25 AM", "08:30 AM"),
        ];
        let want: Vec<(String, &str, String, String)> = want
            .into_iter()
            .map(|(a, b, c, e)| (a.to_string(), b, c.to_string(), e.to_string()))
            .collect();
        assert_eq!(got, want);
        assert!(s.iter().all(|t| !t.completed && t.preference == Preference::Morning));
    }

    #[test]
    fn empty_topics_yield_empty_schedule() {
        let s = generate_tasks(&[], d(10), 2.0, Preference::Morning, d(1)).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn rejects_non_positive_hours() {
        for hours in [0.0, -1.0, f64::NAN] {
            let err =
                generate_tasks(&many(1), d(10), hours, Preference::Morning, d(1)).unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[test]
    fn afternoon_starts_at_two() {
        let s = generate_tasks(&many(1), d(10), 1.0, Preference::Afternoon, d(1)).unwrap();
        assert_eq!(s.tasks()[0].start_display(), "02:00 PM");
        assert_eq!(s.tasks()[0].preference, Preference::Afternoon);
    }

    #[test]
    fn fourth_session_of_day_gets_long_break() {
        // 3h = 180 min: sessions at 0,30,60,90(long, ends 135),135,165 -> 6th needs 195 > 180
        let s = generate_tasks(&many(6), d(10), 3.0, Preference::Morning, d(1)).unwrap();
        let breaks: Vec<&Task> = s.iter().filter(|t| t.kind == TaskKind::Break).collect();
        assert_eq!(breaks[3].label, LONG_BREAK_LABEL);
        assert_eq!(breaks[3].duration_minutes, 20);
        assert_eq!(breaks[3].end_display(), "10:15 AM");
        assert!(breaks.iter().enumerate().all(|(i, b)| (i == 3) == b.is_long_break()));
        assert_eq!(s.tasks()[8].date, d(1));
        assert_eq!(s.tasks()[8].start_display(), "10:15 AM");
        // 165 + 30 > 180: sixth item opens day two.
        assert_eq!(s.tasks()[10].date, d(2));
        assert_eq!(s.tasks()[10].start_display(), "08:00 AM");
    }

    #[test]
    fn short_break_look_ahead_can_overshoot_on_long_break() {
        // 2h = 120 min: 4th pair starts at 90, look-ahead 90+30 = 120 fits,
        // but the long break makes the day 135.
        let s = generate_tasks(&many(4), d(10), 2.0, Preference::Morning, d(1)).unwrap();
        assert_eq!(s.last_date(), Some(d(1)));
        assert_eq!(s.minutes_on(d(1)), 135);
    }

    #[test]
    fn upcoming_break_policy_stays_within_budget() {
        let cfg = SchedulerConfig {
            budget_check: BudgetCheck::UpcomingBreak,
            ..SchedulerConfig::default()
        };
        let s = Scheduler::new(cfg)
            .unwrap()
            .generate(&many(4), d(10), 2.0, Preference::Morning, d(1))
            .unwrap();
        assert_eq!(s.minutes_on(d(1)), 90);
        // Rolled pair is the first of a new day, so its break is short.
        assert_eq!(s.tasks()[6].date, d(2));
        assert!(!s.tasks()[7].is_long_break());
    }

    #[test]
    fn tiny_budget_puts_each_item_on_its_own_day() {
        // 15 min never fits a pair, so even the first item rolls past today.
        let s = generate_tasks(&many(3), d(10), 0.25, Preference::Morning, d(1)).unwrap();
        let dates: Vec<NaiveDate> = s.iter().step_by(2).map(|t| t.date).collect();
        assert_eq!(dates, vec![d(2), d(3), d(4)]);
    }

    #[test]
    fn fractional_hours_floor_to_minutes() {
        assert_eq!(daily_budget_minutes(1.5).unwrap(), 90);
        assert_eq!(daily_budget_minutes(0.995).unwrap(), 59);
        assert_eq!(daily_budget_minutes(0.02).unwrap(), 1);
        assert!(daily_budget_minutes(0.01).is_err());
        assert!(daily_budget_minutes(25.0).is_err());
    }

    #[test]
    fn fractional_budget_below_a_pair_boundary_rolls() {
        // 0.995h = 59.7 min: a second pair needs 60, so it moves to day two.
        let s = generate_tasks(&many(2), d(10), 0.995, Preference::Morning, d(1)).unwrap();
        assert_eq!(s.tasks()[0].date, d(1));
        assert_eq!(s.tasks()[2].date, d(2));
        assert_eq!(s.tasks()[2].start_display(), "08:00 AM");
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = SchedulerConfig {
            long_break_every: 0,
            ..SchedulerConfig::default()
        };
        assert!(Scheduler::new(cfg).is_err());
    }
}
