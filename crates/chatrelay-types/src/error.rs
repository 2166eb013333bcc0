use thiserror::Error;

use crate::assistants::RunStatus;

/// Outcome of a failed relay exchange.
///
/// Each variant maps to one class of the HTTP error taxonomy: client input
/// validation, upstream non-success, provider job non-completion, and
/// unexpected failures.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Client input rejected before any upstream call.
    #[error("{0}")]
    Validation(String),

    /// An upstream call answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// An Assistants run ended (or stopped being polled) without completing.
    #[error("Run did not succeed")]
    RunNotCompleted { status: RunStatus },

    /// The completed thread holds no assistant message.
    #[error("No assistant message found")]
    NoAssistantMessage,

    /// The agent answered without a completion stream.
    #[error("agent response contained no completion stream")]
    MissingCompletion,

    /// The agent invocation failed; the message is passed through to the caller.
    #[error("{0}")]
    Agent(String),

    /// A required credential or setting is absent.
    #[error("{0}")]
    Configuration(String),

    /// The upstream could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered with a payload that does not decode.
    #[error("invalid upstream payload: {0}")]
    Decode(String),

    #[error("internal error: {0}")]
    Internal(String),
}
