//! HTTP client for the relay routes.
//!
//! Posts the whole conversation to the selected route and decodes the reply
//! through the single accepted reply schema.

use std::fmt;

use clap::ValueEnum;
use thiserror::Error;

use chatrelay_core::conversation::{Conversation, ReplyError, decode_reply};
use chatrelay_types::relay::ErrorBody;

use crate::http::handlers::agent::SESSION_ID_HEADER;

/// Which relay route the chat client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChatBackend {
    /// `POST /api/aws-bedrock`
    Bedrock,
    /// `POST /api/openai`
    Openai,
}

impl ChatBackend {
    pub fn route(self) -> &'static str {
        match self {
            ChatBackend::Bedrock => "/api/aws-bedrock",
            ChatBackend::Openai => "/api/openai",
        }
    }
}

impl fmt::Display for ChatBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatBackend::Bedrock => write!(f, "bedrock"),
            ChatBackend::Openai => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to relay failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// One answered turn.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayTurn {
    pub text: String,
    /// Agent session the turn ran in, when the relay reported one.
    pub session_id: Option<String>,
}

pub struct RelayClient {
    http: reqwest::Client,
    url: String,
    backend: ChatBackend,
}

impl RelayClient {
    pub fn new(http: reqwest::Client, server: &str, backend: ChatBackend) -> Self {
        let url = format!("{}{}", server.trim_end_matches('/'), backend.route());
        Self { http, url, backend }
    }

    pub fn backend(&self) -> ChatBackend {
        self.backend
    }

    /// Send the conversation and decode the assistant's reply.
    pub async fn send(&self, conversation: &Conversation) -> Result<RelayTurn, ClientError> {
        let request = match self.backend {
            ChatBackend::Bedrock => self.http.post(&self.url).json(&conversation.agent_request()),
            ChatBackend::Openai => self
                .http
                .post(&self.url)
                .json(&conversation.assistant_request()),
        };

        tracing::debug!(url = %self.url, messages = conversation.len(), "sending turn to relay");
        let response = request.send().await?;

        let status = response.status();
        let session_id = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|error| error.error)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(RelayTurn {
            text: decode_reply(&body)?,
            session_id,
        })
    }
}
