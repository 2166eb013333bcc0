//! Assistants relay: replay the conversation into a new thread, run the
//! assistant, wait for it, and return its newest message.

use tokio::time::sleep;
use tracing::{Instrument, debug, info, info_span, warn};

use chatrelay_types::assistants::{NewRun, NewThreadMessage};
use chatrelay_types::chat::{ChatMessage, InboundMessage};
use chatrelay_types::error::RelayError;

use super::api::AssistantsApi;
use super::extract::extract_reply;
use super::poll::PollPolicy;
use super::run::RunPhase;

/// Relay in front of an [`AssistantsApi`].
///
/// Every request gets its own thread; nothing is reused between requests.
pub struct AssistantRelay<A> {
    api: A,
    assistant_id: String,
    policy: PollPolicy,
}

impl<A: AssistantsApi> AssistantRelay<A> {
    pub fn new(api: A, assistant_id: impl Into<String>, policy: PollPolicy) -> Self {
        Self {
            api,
            assistant_id: assistant_id.into(),
            policy,
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Relay the full conversation and return the assistant's reply.
    ///
    /// Messages are appended strictly in order, one call each. An empty list
    /// still creates a thread and a run.
    ///
    /// # Errors
    ///
    /// - The first upstream error from any step, unchanged.
    /// - [`RelayError::RunNotCompleted`] if the run ends in a non-completed
    ///   status or is still pending after `policy.max_attempts` checks.
    /// - [`RelayError::NoAssistantMessage`] if the thread has no assistant
    ///   message after completion.
    pub async fn relay(&self, messages: &[InboundMessage]) -> Result<ChatMessage, RelayError> {
        let span = info_span!(
            "gen_ai.assistant_run",
            gen_ai.operation.name = "assistant_run",
            gen_ai.assistant.id = %self.assistant_id,
            messages = messages.len(),
        );

        async {
            let thread = self.api.create_thread().await?;
            debug!(thread_id = %thread.id, "thread created");
            let mut phase = RunPhase::created(thread.id.clone());

            for message in messages {
                self.api
                    .create_message(&thread.id, &NewThreadMessage::from(message))
                    .await?;
            }
            phase = phase.appended();

            let run = self
                .api
                .create_run(
                    &thread.id,
                    &NewRun {
                        assistant_id: self.assistant_id.clone(),
                    },
                )
                .await?;
            debug!(run_id = %run.id, status = %run.status, "run created");
            phase = phase.started(run.id, run.status, self.policy.max_attempts);

            while let RunPhase::Running {
                thread_id,
                run_id,
                polls,
                ..
            } = &phase
            {
                sleep(self.policy.interval).await;
                let run = self.api.retrieve_run(thread_id, run_id).await?;
                debug!(attempt = polls + 1, status = %run.status, "run polled");
                phase = phase.poll(run.status, self.policy.max_attempts);
            }

            match &phase {
                RunPhase::TimedOut { status } => {
                    warn!(status = %status, attempts = self.policy.max_attempts, "run still pending, giving up");
                }
                RunPhase::Failed { status } => warn!(status = %status, "run did not complete"),
                _ => {}
            }
            let thread_id = phase.into_completed()?;

            let list = self.api.list_messages(&thread_id).await?;
            let reply = extract_reply(&list)?;
            info!(message_id = %reply.id, chars = reply.content.chars().count(), "assistant reply extracted");
            Ok(reply)
        }
        .instrument(span)
        .await
    }
}
