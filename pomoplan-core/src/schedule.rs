//! Schedule: the ordered task sequence produced by one generation run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Ordered tasks. Order within a date is the canonical session order;
/// grouping by date is derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    tasks: Vec<Task>,
}

impl Schedule {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.tasks.first().map(|t| t.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.tasks.last().map(|t| t.date)
    }

    /// True when the final study day falls strictly before `exam_date`.
    /// An empty schedule trivially finishes in time.
    pub fn finishes_before(&self, exam_date: NaiveDate) -> bool {
        self.last_date().is_none_or(|d| d < exam_date)
    }

    /// (index, task) pairs grouped by date, in date order.
    pub fn by_date(&self) -> BTreeMap<NaiveDate, Vec<(usize, &Task)>> {
        let mut out: BTreeMap<NaiveDate, Vec<(usize, &Task)>> = BTreeMap::new();
        for (i, t) in self.tasks.iter().enumerate() {
            out.entry(t.date).or_default().push((i, t));
        }
        out
    }

    pub fn minutes_on(&self, date: NaiveDate) -> u32 {
        self.tasks
            .iter()
            .filter(|t| t.date == date)
            .map(|t| t.duration_minutes)
            .sum()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

impl From<Vec<Task>> for Schedule {
    fn from(tasks: Vec<Task>) -> Self {
        Self::new(tasks)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Preference;
    use chrono::NaiveTime;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn groups_by_date_and_keeps_indices() {
        let s = Schedule::new(vec![
            Task::focus(d(2), "b", at(8), 25, Preference::Morning),
            Task::focus(d(1), "a", at(8), 25, Preference::Morning),
            Task::rest(d(2), false, at(9), 5, Preference::Morning),
        ]);
        let groups = s.by_date();
        let days: Vec<_> = groups.keys().copied().collect();
        assert_eq!(days, vec![d(1), d(2)]);
        let idx: Vec<usize> = groups[&d(2)].iter().map(|(i, _)| *i).collect();
        assert_eq!(idx, vec![0, 2]);
        assert_eq!(s.minutes_on(d(2)), 30);
    }

    #[test]
    fn finish_check_is_strict() {
        let s = Schedule::new(vec![Task::focus(d(5), "x", at(8), 25, Preference::Morning)]);
        assert!(s.finishes_before(d(6)));
        assert!(!s.finishes_before(d(5)));
        assert!(Schedule::default().finishes_before(d(1)));
    }
}
