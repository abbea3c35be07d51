//! Carry completion flags from a previous schedule onto a regenerated one.
//!
//! Dates and times shift on replan, so tasks are matched by label only.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileKey {
    /// Any completed task with the same label marks every new task with that
    /// label completed. Duplicate labels (including the break labels) collide.
    #[default]
    Label,
    /// Match the n-th occurrence of a label to the n-th occurrence in the old
    /// schedule, so duplicates are tracked individually.
    LabelOccurrence,
}

/// Reconcile with the default label-only matching.
pub fn reconcile(previous: &[Task], next: Schedule) -> Schedule {
    reconcile_with(previous, next, ReconcileKey::Label)
}

pub fn reconcile_with(previous: &[Task], next: Schedule, key: ReconcileKey) -> Schedule {
    let mut tasks = next.into_tasks();
    match key {
        ReconcileKey::Label => {
            let done: HashSet<&str> = previous
                .iter()
                .filter(|t| t.completed)
                .map(|t| t.label.as_str())
                .collect();
            for t in &mut tasks {
                t.completed = done.contains(t.label.as_str());
            }
        }
        ReconcileKey::LabelOccurrence => {
            let done: HashSet<(&str, usize)> = occurrences(previous)
                .filter(|(_, t)| t.completed)
                .map(|(n, t)| (t.label.as_str(), n))
                .collect();
            let flags: Vec<bool> = occurrences(&tasks)
                .map(|(n, t)| done.contains(&(t.label.as_str(), n)))
                .collect();
            for (t, flag) in tasks.iter_mut().zip(flags) {
                t.completed = flag;
            }
        }
    }
    Schedule::new(tasks)
}

/// Pair each task with how many earlier tasks share its label.
fn occurrences(tasks: &[Task]) -> impl Iterator<Item = (usize, &Task)> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    tasks.iter().map(move |t| {
        let n = seen.entry(t.label.as_str()).or_insert(0);
        let out = (*n, t);
        *n += 1;
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::generate_tasks;
    use crate::task::SHORT_BREAK_LABEL;
    use crate::time::Preference;
    use crate::topic::Topic;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn topics() -> Vec<Topic> {
        vec![
            Topic::new("Cells"),
            Topic::new("Genetics").with_subtopics(["DNA", "RNA"]),
        ]
    }

    #[test]
    fn completed_label_survives_replan() {
        let mut old = generate_tasks(&topics(), d(11), 1.0, Preference::Morning, d(1)).unwrap();
        old.tasks_mut()[0].completed = true;

        let mut edited = topics();
        edited.push(Topic::new("Evolution"));
        let new = generate_tasks(&edited, d(20), 3.0, Preference::Afternoon, d(3)).unwrap();
        let new = reconcile(old.tasks(), new);

        let cells = new.iter().find(|t| t.label == "Cells").unwrap();
        assert!(cells.completed);
        let evo = new.iter().find(|t| t.label == "Evolution").unwrap();
        assert!(!evo.completed);
        assert_eq!(new.completed_count(), 1);
    }

    #[test]
    fn stale_flags_on_new_schedule_are_cleared() {
        let old = generate_tasks(&topics(), d(11), 1.0, Preference::Morning, d(1)).unwrap();
        let mut new = old.clone();
        new.tasks_mut()[2].completed = true;
        let new = reconcile(old.tasks(), new);
        assert_eq!(new.completed_count(), 0);
    }

    #[test]
    fn label_matching_spreads_across_duplicate_labels() {
        let mut old = generate_tasks(&topics(), d(11), 1.0, Preference::Morning, d(1)).unwrap();
        old.tasks_mut()[1].completed = true; // first short break
        let new = generate_tasks(&topics(), d(11), 1.0, Preference::Morning, d(1)).unwrap();

        let by_label = reconcile(old.tasks(), new.clone());
        let breaks_done = by_label
            .iter()
            .filter(|t| t.label == SHORT_BREAK_LABEL && t.completed)
            .count();
        assert_eq!(breaks_done, 3);

        let by_occurrence = reconcile_with(old.tasks(), new, ReconcileKey::LabelOccurrence);
        let done: Vec<usize> = by_occurrence
            .iter()
            .enumerate()
            .filter(|(_, t)| t.completed)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(done, vec![1]);
    }
}
