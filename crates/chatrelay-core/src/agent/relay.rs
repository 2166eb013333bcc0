//! Agent relay: one inbound turn -> one agent invocation -> one reply string.

use futures_util::StreamExt;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use chatrelay_types::chat::{InboundMessage, Role};
use chatrelay_types::error::RelayError;
use chatrelay_types::relay::AgentChatRequest;

use super::runtime::AgentRuntime;

/// Reply of a single agent turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTurn {
    /// Session the turn ran in (echoed from the request or freshly generated).
    pub session_id: String,
    /// All answer chunks joined and decoded as UTF-8.
    pub text: String,
}

/// Stateless relay in front of an [`AgentRuntime`].
///
/// Only the latest user utterance is forwarded; the agent keeps history on
/// its side, keyed by session.
pub struct AgentRelay<R> {
    runtime: R,
}

impl<R: AgentRuntime> AgentRelay<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Relay one turn.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Validation`] when the list is empty or does not end in
    ///   a user message with content. No upstream call is made.
    /// - [`RelayError::MissingCompletion`] when the agent produced no stream.
    /// - Whatever the runtime reports for the invocation or any chunk.
    pub async fn relay(&self, request: AgentChatRequest) -> Result<AgentTurn, RelayError> {
        let input_text = latest_utterance(&request.messages)?.to_string();
        let session_id = request
            .session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let span = info_span!(
            "gen_ai.invoke_agent",
            gen_ai.operation.name = "invoke_agent",
            session_id = %session_id,
        );

        async {
            let mut stream = self
                .runtime
                .invoke(&session_id, &input_text)
                .await?
                .ok_or(RelayError::MissingCompletion)?;

            let mut buffer = Vec::new();
            let mut chunks = 0usize;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                chunks += 1;
                debug!(chunk = chunks, bytes = chunk.len(), "agent chunk received");
                buffer.extend_from_slice(&chunk);
            }

            let text = decode_utf8(buffer);
            info!(chunks, chars = text.chars().count(), "agent response assembled");

            Ok(AgentTurn {
                session_id: session_id.clone(),
                text,
            })
        }
        .instrument(span)
        .await
    }
}

/// The content of the last message, which must be a non-empty user turn.
pub fn latest_utterance(messages: &[InboundMessage]) -> Result<&str, RelayError> {
    let last = messages
        .last()
        .ok_or_else(|| RelayError::Validation("No messages provided.".to_string()))?;

    if last.role != Role::User || last.content.is_empty() {
        return Err(RelayError::Validation(
            "The last message must be a user message with content.".to_string(),
        ));
    }

    Ok(&last.content)
}

/// Decode the joined chunk buffers.
///
/// Chunks are joined before decoding so a multi-byte character split across
/// two chunks survives; invalid sequences become U+FFFD.
fn decode_utf8(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
