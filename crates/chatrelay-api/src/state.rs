//! Application state wiring both relays to their upstream clients.
//!
//! A relay whose credentials are missing is kept as [`Backend::Unavailable`]
//! so the server still starts; its route answers with a configuration error.

use std::sync::Arc;

use chatrelay_core::agent::AgentRelay;
use chatrelay_core::assistants::{AssistantRelay, PollPolicy};
use chatrelay_infra::bedrock::BedrockAgentClient;
use chatrelay_infra::credentials::{bedrock_auth, openai_api_key};
use chatrelay_infra::http::build_http_client;
use chatrelay_infra::openai::OpenAiAssistantsClient;
use chatrelay_types::config::RelayConfig;
use chatrelay_types::error::RelayError;

/// Concrete relay types pinned to the infra clients.
pub type BedrockRelay = AgentRelay<BedrockAgentClient>;
pub type OpenAiRelay = AssistantRelay<OpenAiAssistantsClient>;

/// A relay that is either ready to serve or unavailable with a reason.
pub enum Backend<T> {
    Ready(Arc<T>),
    Unavailable(String),
}

impl<T> Clone for Backend<T> {
    fn clone(&self) -> Self {
        match self {
            Backend::Ready(relay) => Backend::Ready(Arc::clone(relay)),
            Backend::Unavailable(reason) => Backend::Unavailable(reason.clone()),
        }
    }
}

impl<T> Backend<T> {
    pub fn get(&self) -> Result<&T, RelayError> {
        match self {
            Backend::Ready(relay) => Ok(relay),
            Backend::Unavailable(reason) => Err(RelayError::Configuration(reason.clone())),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Backend::Ready(_))
    }
}

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub agent: Backend<BedrockRelay>,
    pub assistants: Backend<OpenAiRelay>,
}

impl AppState {
    /// Build both relays from configuration and environment credentials.
    pub fn init(config: RelayConfig, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let client = build_http_client()?;

        let agent = match bedrock_auth(&lookup) {
            Ok(auth) => {
                tracing::info!(
                    agent_id = %config.bedrock.agent_id,
                    region = %config.bedrock.region,
                    auth = auth.scheme(),
                    "Bedrock agent relay enabled"
                );
                Backend::Ready(Arc::new(AgentRelay::new(BedrockAgentClient::new(
                    client.clone(),
                    &config.bedrock,
                    auth,
                ))))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Bedrock agent relay disabled");
                Backend::Unavailable(format!("Bedrock agent is not configured: {e}"))
            }
        };

        let assistants = match openai_api_key(&lookup) {
            Ok(api_key) => {
                tracing::info!(
                    assistant_id = %config.openai.assistant_id,
                    "OpenAI assistants relay enabled"
                );
                let api = OpenAiAssistantsClient::new(client, api_key, config.openai.base_url.clone());
                Backend::Ready(Arc::new(AssistantRelay::new(
                    api,
                    config.openai.assistant_id.clone(),
                    PollPolicy::from(&config.openai),
                )))
            }
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI assistants relay disabled");
                Backend::Unavailable(format!("OpenAI assistant is not configured: {e}"))
            }
        };

        Ok(Self {
            config: Arc::new(config),
            agent,
            assistants,
        })
    }
}
