//! Derived views over a schedule: per-day grouping and progress.

use chrono::NaiveDate;
use serde::Serialize;

use crate::schedule::Schedule;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView<'a> {
    pub date: NaiveDate,
    /// (schedule index, task)
    pub tasks: Vec<(usize, &'a Task)>,
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub completed: usize,
}

impl DayView<'_> {
    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn total_minutes(&self) -> u32 {
        self.focus_minutes + self.break_minutes
    }
}

pub fn day_views(schedule: &Schedule) -> Vec<DayView<'_>> {
    schedule
        .by_date()
        .into_iter()
        .map(|(date, tasks)| {
            let mut view = DayView {
                date,
                tasks: Vec::with_capacity(tasks.len()),
                focus_minutes: 0,
                break_minutes: 0,
                completed: 0,
            };
            for (i, t) in tasks {
                if t.is_focus() {
                    view.focus_minutes += t.duration_minutes;
                } else {
                    view.break_minutes += t.duration_minutes;
                }
                if t.completed {
                    view.completed += 1;
                }
                view.tasks.push((i, t));
            }
            view
        })
        .collect()
}

/// Dashboard numbers for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct DayProgress {
    pub completed: usize,
    pub total: usize,
    pub focus_minutes_done: u32,
}

impl DayProgress {
    pub fn study_hours(&self) -> f64 {
        f64::from(self.focus_minutes_done) / 60.0
    }

    /// 0.0..=1.0; an empty day counts as no progress.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

pub fn progress_on(schedule: &Schedule, date: NaiveDate) -> DayProgress {
    schedule
        .iter()
        .filter(|t| t.date == date)
        .fold(DayProgress::default(), |mut p, t| {
            p.total += 1;
            if t.completed {
                p.completed += 1;
                if t.is_focus() {
                    p.focus_minutes_done += t.duration_minutes;
                }
            }
            p
        })
}

/// First task on `date` that is not completed yet.
pub fn next_pending(schedule: &Schedule, date: NaiveDate) -> Option<(usize, &Task)> {
    schedule
        .iter()
        .enumerate()
        .find(|(_, t)| t.date == date && !t.completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::generate_tasks;
    use crate::time::Preference;
    use crate::topic::Topic;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample() -> Schedule {
        let topics = vec![
            Topic::new("Cells"),
            Topic::new("Genetics").with_subtopics(["DNA", "RNA"]),
        ];
        generate_tasks(&topics, d(11), 1.0, Preference::Morning, d(1)).unwrap()
    }

    #[test]
    fn day_views_split_minutes() {
        let s = sample();
        let views = day_views(&s);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].date, d(1));
        assert_eq!(views[0].focus_minutes, 50);
        assert_eq!(views[0].break_minutes, 10);
        assert_eq!(views[0].total(), 4);
        assert_eq!(views[1].tasks[0].0, 4);
    }

    #[test]
    fn progress_counts_completed_focus_time() {
        let mut s = sample();
        s.tasks_mut()[0].completed = true;
        s.tasks_mut()[1].completed = true;
        let p = progress_on(&s, d(1));
        assert_eq!((p.completed, p.total), (2, 4));
        assert_eq!(p.focus_minutes_done, 25);
        assert!((p.ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(progress_on(&s, d(9)), DayProgress::default());

        let (i, t) = next_pending(&s, d(1)).unwrap();
        assert_eq!(i, 2);
        assert_eq!(t.label, "Genetics: DNA");
    }
}
