//! Lifecycle of a single assistants request.
//!
//! ```text
//! Created -> MessagesAppended -> Running { polls } -> Completed
//!                                                  -> Failed
//!                                                  -> TimedOut
//! ```
//!
//! Only `Running` loops. Each [`RunPhase::poll`] consumes one attempt; once
//! `max_attempts` checks have all reported a pending status the phase becomes
//! `TimedOut` carrying the last observed status.

use chatrelay_types::assistants::RunStatus;
use chatrelay_types::error::RelayError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    Created { thread_id: String },
    MessagesAppended { thread_id: String },
    Running {
        thread_id: String,
        run_id: String,
        status: RunStatus,
        polls: u32,
    },
    Completed { thread_id: String },
    Failed { status: RunStatus },
    TimedOut { status: RunStatus },
}

impl RunPhase {
    pub fn created(thread_id: impl Into<String>) -> Self {
        RunPhase::Created {
            thread_id: thread_id.into(),
        }
    }

    /// All inbound messages have been appended.
    pub fn appended(self) -> Self {
        match self {
            RunPhase::Created { thread_id } => RunPhase::MessagesAppended { thread_id },
            other => other,
        }
    }

    /// The run was created with `status`. No poll has happened yet.
    pub fn started(self, run_id: impl Into<String>, status: RunStatus, max_attempts: u32) -> Self {
        match self {
            RunPhase::MessagesAppended { thread_id } => {
                settle(thread_id, run_id.into(), status, 0, max_attempts)
            }
            other => other,
        }
    }

    /// Record the status returned by one retrieve call.
    pub fn poll(self, status: RunStatus, max_attempts: u32) -> Self {
        match self {
            RunPhase::Running {
                thread_id,
                run_id,
                polls,
                ..
            } => settle(thread_id, run_id, status, polls + 1, max_attempts),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::Completed { .. } | RunPhase::Failed { .. } | RunPhase::TimedOut { .. }
        )
    }

    /// Thread id of a completed run, or the error the phase stands for.
    pub fn into_completed(self) -> Result<String, RelayError> {
        match self {
            RunPhase::Completed { thread_id } => Ok(thread_id),
            RunPhase::Failed { status } | RunPhase::TimedOut { status } => {
                Err(RelayError::RunNotCompleted { status })
            }
            other => Err(RelayError::Internal(format!(
                "run left in non-terminal phase {other:?}"
            ))),
        }
    }
}

fn settle(thread_id: String, run_id: String, status: RunStatus, polls: u32, max: u32) -> RunPhase {
    if status == RunStatus::Completed {
        RunPhase::Completed { thread_id }
    } else if status.is_pending() && polls < max {
        RunPhase::Running {
            thread_id,
            run_id,
            status,
            polls,
        }
    } else if status.is_pending() {
        RunPhase::TimedOut { status }
    } else {
        RunPhase::Failed { status }
    }
}
