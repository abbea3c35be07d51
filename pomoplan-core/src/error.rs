//! Error type shared by the scheduler, the plan manager and the timer session.

use thiserror::Error;

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Caller handed us something the contract forbids (non-positive hours,
    /// empty topic list, exam date too close).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no study plan stored for '{owner}'")]
    PlanNotFound { owner: String },

    #[error("task index {index} out of range (schedule has {len} tasks)")]
    TaskIndexOutOfRange { index: usize, len: usize },

    /// Only one timer session may run at a time.
    #[error("another session is already running: {active}")]
    SessionBusy { active: String },

    #[error("no active session")]
    NoActiveSession,

    #[error("store error: {0}")]
    Store(String),
}

impl PlanError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
