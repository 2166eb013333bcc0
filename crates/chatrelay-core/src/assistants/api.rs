//! AssistantsApi trait definition.
//!
//! The five thread/run operations the relay needs from a hosted
//! assistants service. Uses RPITIT, like [`crate::agent::AgentRuntime`].

use std::future::Future;

use chatrelay_types::assistants::{MessageList, NewRun, NewThreadMessage, Run, Thread};
use chatrelay_types::error::RelayError;

pub trait AssistantsApi: Send + Sync {
    /// Create a fresh, empty thread.
    fn create_thread(&self) -> impl Future<Output = Result<Thread, RelayError>> + Send;

    /// Append one message to a thread.
    fn create_message(
        &self,
        thread_id: &str,
        message: &NewThreadMessage,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;

    /// Start a run of an assistant over a thread.
    fn create_run(
        &self,
        thread_id: &str,
        run: &NewRun,
    ) -> impl Future<Output = Result<Run, RelayError>> + Send;

    /// Fetch the current state of a run.
    fn retrieve_run(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> impl Future<Output = Result<Run, RelayError>> + Send;

    /// List a thread's messages, newest first.
    fn list_messages(
        &self,
        thread_id: &str,
    ) -> impl Future<Output = Result<MessageList, RelayError>> + Send;
}
