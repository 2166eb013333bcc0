//! AgentRuntime trait definition.
//!
//! Abstracts a managed conversational agent invoked once per turn with a
//! session identifier. Uses RPITIT for `invoke`; the answer is a boxed stream
//! of raw chunk buffers in arrival order.

use std::pin::Pin;

use futures_util::Stream;

use chatrelay_types::error::RelayError;

/// Raw answer fragments of one agent invocation, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, RelayError>> + Send + 'static>>;

/// Trait for managed agent backends (AWS Bedrock Agents).
///
/// Implementations live in chatrelay-infra (e.g., `BedrockAgentClient`).
pub trait AgentRuntime: Send + Sync {
    /// Invoke the agent with a single utterance within `session_id`.
    ///
    /// Returns `Ok(None)` when the upstream accepted the call but produced no
    /// completion stream.
    fn invoke(
        &self,
        session_id: &str,
        input_text: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChunkStream>, RelayError>> + Send;
}
