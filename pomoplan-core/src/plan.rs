//! Plan manager: persists generated schedules and replans without losing
//! completion state.
//!
//! Storage is a document store keyed by owner; the manager always replaces the
//! whole plan document, never patches individual tasks in place.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PlanError, PlanResult};
use crate::reconcile::{ReconcileKey, reconcile_with};
use crate::schedule::Schedule;
use crate::scheduler::Scheduler;
use crate::time::{Clock, Preference};
use crate::topic::Topic;

/// Key-value document store with get/set/update semantics.
pub trait PlanStore {
    fn get(&self, owner: &str) -> PlanResult<Option<StudyPlan>>;

    fn set(&mut self, owner: &str, plan: &StudyPlan) -> PlanResult<()>;

    /// Read-modify-write of an existing document.
    fn update<F>(&mut self, owner: &str, f: F) -> PlanResult<StudyPlan>
    where
        F: FnOnce(&mut StudyPlan) -> PlanResult<()>,
    {
        let mut plan = self.get(owner)?.ok_or_else(|| PlanError::PlanNotFound {
            owner: owner.to_string(),
        })?;
        f(&mut plan)?;
        self.set(owner, &plan)?;
        Ok(plan)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    docs: HashMap<String, StudyPlan>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for MemoryStore {
    fn get(&self, owner: &str) -> PlanResult<Option<StudyPlan>> {
        Ok(self.docs.get(owner).cloned())
    }

    fn set(&mut self, owner: &str, plan: &StudyPlan) -> PlanResult<()> {
        self.docs.insert(owner.to_string(), plan.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParams {
    pub topics: Vec<Topic>,
    pub exam_date: NaiveDate,
    pub study_hours_per_day: f64,
    #[serde(default)]
    pub preference: Preference,
}

/// The persisted plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub params: PlanParams,
    pub generated_on: NaiveDate,
    pub tasks: Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PlanWarning {
    /// The last study day is on or after the exam.
    ExamOverrun {
        last_date: NaiveDate,
        exam_date: NaiveDate,
    },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::ExamOverrun {
                last_date,
                exam_date,
            } => write!(
                f,
                "schedule runs until {last_date}, not before the exam on {exam_date}; \
                 consider more hours per day or fewer topics"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub plan: StudyPlan,
    pub warnings: Vec<PlanWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPolicy {
    /// Exam must be at least this many days after today.
    pub min_days_before_exam: i64,
    pub max_hours_per_day: f64,
    pub reconcile_key: ReconcileKey,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            min_days_before_exam: 1,
            max_hours_per_day: 12.0,
            reconcile_key: ReconcileKey::Label,
        }
    }
}

impl PlanPolicy {
    pub fn validate(&self, params: &PlanParams, today: NaiveDate) -> PlanResult<()> {
        if params.topics.is_empty() {
            return Err(PlanError::invalid("no topics to schedule"));
        }
        let hours = params.study_hours_per_day;
        if !hours.is_finite() || hours <= 0.0 {
            return Err(PlanError::invalid(format!(
                "study hours per day must be positive, got {hours}"
            )));
        }
        if hours > self.max_hours_per_day {
            return Err(PlanError::invalid(format!(
                "study hours per day must be at most {}, got {hours}",
                self.max_hours_per_day
            )));
        }
        let lead = (params.exam_date - today).num_days();
        if lead < self.min_days_before_exam {
            return Err(PlanError::invalid(format!(
                "exam date {} must be at least {} day(s) after {today}",
                params.exam_date, self.min_days_before_exam
            )));
        }
        Ok(())
    }
}

pub struct PlanManager<S: PlanStore, C: Clock> {
    store: S,
    clock: C,
    scheduler: Scheduler,
    policy: PlanPolicy,
}

impl<S: PlanStore, C: Clock> PlanManager<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            scheduler: Scheduler::default(),
            policy: PlanPolicy::default(),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_policy(mut self, policy: PlanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load(&self, owner: &str) -> PlanResult<StudyPlan> {
        self.store
            .get(owner)?
            .ok_or_else(|| PlanError::PlanNotFound {
                owner: owner.to_string(),
            })
    }

    /// First generation (upload flow). Replaces any existing plan.
    pub fn generate(&mut self, owner: &str, params: PlanParams) -> PlanResult<PlanOutcome> {
        let plan = self.build(params)?;
        self.store.set(owner, &plan)?;
        info!(owner, tasks = plan.tasks.len(), "saved new study plan");
        Ok(outcome(plan))
    }

    /// Regenerate with edited parameters, keeping completion flags by label.
    pub fn replan(&mut self, owner: &str, params: PlanParams) -> PlanResult<PlanOutcome> {
        let previous = self.load(owner)?;
        let fresh = self.build(params)?;
        let tasks = reconcile_with(previous.tasks.tasks(), fresh.tasks, self.policy.reconcile_key);
        let plan = StudyPlan { tasks, ..fresh };
        self.store.set(owner, &plan)?;
        info!(
            owner,
            tasks = plan.tasks.len(),
            carried = plan.tasks.completed_count(),
            "replanned study plan"
        );
        Ok(outcome(plan))
    }

    pub fn set_completed(
        &mut self,
        owner: &str,
        index: usize,
        completed: bool,
    ) -> PlanResult<StudyPlan> {
        self.store.update(owner, |plan| {
            let len = plan.tasks.len();
            let task = plan
                .tasks
                .tasks_mut()
                .get_mut(index)
                .ok_or(PlanError::TaskIndexOutOfRange { index, len })?;
            task.completed = completed;
            Ok(())
        })
    }

    /// Mark every task carrying `label` completed; returns how many changed.
    pub fn complete_label(&mut self, owner: &str, label: &str) -> PlanResult<usize> {
        let mut changed = 0;
        self.store.update(owner, |plan| {
            for t in plan.tasks.tasks_mut().iter_mut().filter(|t| t.label == label) {
                if !t.completed {
                    t.completed = true;
                    changed += 1;
                }
            }
            Ok(())
        })?;
        Ok(changed)
    }

    fn build(&self, params: PlanParams) -> PlanResult<StudyPlan> {
        let today = self.clock.today();
        self.policy.validate(&params, today)?;
        let tasks = self.scheduler.generate(
            &params.topics,
            params.exam_date,
            params.study_hours_per_day,
            params.preference,
            today,
        )?;
        Ok(StudyPlan {
            params,
            generated_on: today,
            tasks,
        })
    }
}

fn outcome(plan: StudyPlan) -> PlanOutcome {
    let mut warnings = Vec::new();
    let exam_date = plan.params.exam_date;
    if let Some(last_date) = plan.tasks.last_date().filter(|d| *d >= exam_date) {
        warn!(%last_date, %exam_date, "schedule does not finish before the exam");
        warnings.push(PlanWarning::ExamOverrun {
            last_date,
            exam_date,
        });
    }
    PlanOutcome { plan, warnings }
}
