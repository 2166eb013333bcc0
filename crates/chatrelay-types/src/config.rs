//! Relay configuration types.
//!
//! `RelayConfig` mirrors `chatrelay.toml`. Every field has a default, so an
//! empty or missing file yields a runnable configuration pointing at the
//! production agent and assistant.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the relay service and chat client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bedrock: BedrockConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of static widget assets served for non-API paths.
    #[serde(default)]
    pub web_dir: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            web_dir: None,
        }
    }
}

/// Bedrock Agent Runtime target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    #[serde(default = "default_agent_alias_id")]
    pub agent_alias_id: String,
    /// Overrides `https://bedrock-agent-runtime.{region}.amazonaws.com`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub enable_trace: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_agent_id() -> String {
    "SS2ALX2HQ3".to_string()
}

fn default_agent_alias_id() -> String {
    "LY6OCPKYDK".to_string()
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            agent_id: default_agent_id(),
            agent_alias_id: default_agent_alias_id(),
            endpoint: None,
            enable_trace: false,
        }
    }
}

/// OpenAI Assistants target and run polling policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_assistant_id")]
    pub assistant_id: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_assistant_id() -> String {
    "asst_nipc9GXJQ6gmPoWo6i3Bs9tV".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_max_poll_attempts() -> u32 {
    20
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            assistant_id: default_assistant_id(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

/// Chat client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Base URL of the relay service the chat client talks to.
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_welcome_message() -> String {
    "¡Hola! Soy el asistente virtual de epoint.es ¿En qué puedo ayudarte hoy? \
     Puedes preguntarme sobre nuestros servicios de desarrollo web, marketing digital \
     o consultoría tecnológica."
        .to_string()
}

fn default_server_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
            server_url: default_server_url(),
        }
    }
}
