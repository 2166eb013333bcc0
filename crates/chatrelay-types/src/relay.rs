//! Request and reply bodies of the two relay routes.
//!
//! - `POST /api/aws-bedrock`: [`AgentChatRequest`] -> [`AgentChatReply`]
//! - `POST /api/openai`: [`AssistantChatRequest`] -> [`crate::chat::ChatMessage`]
//!
//! Failures on either route answer with an [`ErrorBody`].

use serde::{Deserialize, Serialize};

use crate::chat::InboundMessage;

/// Body of `POST /api/aws-bedrock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatRequest {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    /// Agent session to continue; a fresh one is generated when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Successful reply of `POST /api/aws-bedrock`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentChatReply {
    pub text: String,
}

/// Body of `POST /api/openai`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantChatRequest {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

/// Error reply shared by both routes.
///
/// `status` carries the final run status tag when an Assistants run did not
/// complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}
