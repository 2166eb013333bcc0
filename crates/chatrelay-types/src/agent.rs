//! AWS Bedrock Agent Runtime payloads used by the agent relay.
//!
//! `InvokeAgent` takes a JSON body and answers with an AWS event stream whose
//! `chunk` events carry `{"bytes":"<base64>"}` payloads. The decoded bytes are
//! a fragment of the agent's answer text.

use serde::{Deserialize, Serialize};

/// Body of `POST /agents/{agentId}/agentAliases/{aliasId}/sessions/{sessionId}/text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeAgentRequest {
    pub input_text: String,
    pub enable_trace: bool,
    pub end_session: bool,
}

/// Payload of a `chunk` event.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentChunkPayload {
    /// Base64-encoded answer fragment.
    pub bytes: String,
}

/// Payload of an exception frame or of a non-2xx response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentExceptionPayload {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}
