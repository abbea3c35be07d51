use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use pomoplan_core::{ActiveSession, Clock, PlanManager, PlanStore, TaskKind, format_countdown};
use std::path::Path;
use tracing::{info, warn};

use crate::state::{read_session, write_session};

#[derive(Subcommand, Debug)]
pub enum TimerCommand {
    /// Start the Pomodoro timer for a task (index as shown by `pomoplan show`)
    Start { index: usize },

    /// Show the running session and time left
    Status,

    /// Abandon the running session without completing the task
    Stop,

    /// Complete the task once its session has run out
    Finish {
        /// Complete it even if time is left
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

pub fn run<S: PlanStore, C: Clock>(
    cmd: TimerCommand,
    manager: &mut PlanManager<S, C>,
    owner: &str,
    session_file: &Path,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut slot = read_session(session_file)?;
    match cmd {
        TimerCommand::Start { index } => {
            let plan = manager.load(owner)?;
            let task = plan
                .tasks
                .get(index)
                .with_context(|| format!("no task at index {index} ({} tasks)", plan.tasks.len()))?;
            if task.completed {
                bail!("task {index} ({}) is already completed", task.label);
            }
            let session = slot.start(ActiveSession::for_task(index, task, now))?;
            info!(owner = %session.owner_id, "timer started");
            println!(
                "{} started: {} ({} left)",
                phase_name(session.kind),
                session.label,
                format_countdown(session.remaining_secs(now))
            );
        }
        TimerCommand::Status => match slot.active() {
            Some(s) if s.is_finished(now) => {
                println!("{} done: {} (run `pomoplan timer finish`)", phase_name(s.kind), s.label);
            }
            Some(s) => println!(
                "{}: {} - {} left",
                phase_name(s.kind),
                s.label,
                format_countdown(s.remaining_secs(now))
            ),
            None => println!("No active session."),
        },
        TimerCommand::Stop => {
            let s = slot.stop()?;
            println!("Stopped: {}", s.label);
        }
        TimerCommand::Finish { force } => {
            let finished = if force {
                slot.stop()?
            } else {
                match slot.take_finished(now) {
                    Some(s) => s,
                    None => {
                        let left = slot.active().map(|s| s.remaining_secs(now));
                        match left {
                            Some(secs) => bail!(
                                "session still running ({} left); pass --force to complete now",
                                format_countdown(secs)
                            ),
                            None => bail!("no active session"),
                        }
                    }
                }
            };
            let plan = manager.load(owner)?;
            let Some(index) = finished.locate(&plan.tasks) else {
                bail!(
                    "'{}' is no longer a pending task in the plan; run `pomoplan timer stop`",
                    finished.label
                );
            };
            if index != finished.task_index {
                warn!(
                    from = finished.task_index,
                    to = index,
                    label = %finished.label,
                    "plan changed while the timer ran, completing the moved task"
                );
            }
            manager.set_completed(owner, index, true)?;
            info!(owner = %finished.owner_id, "timer finished, task completed");
            println!("Completed: {}", finished.label);
        }
    }
    write_session(session_file, &slot)
}

fn phase_name(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Focus => "Focus Time",
        TaskKind::Break => "Break",
    }
}
