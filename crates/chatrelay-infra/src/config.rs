//! Relay configuration loader.
//!
//! Reads `chatrelay.toml` and deserializes it into [`RelayConfig`]. Falls
//! back to defaults when the file is missing or malformed, then applies
//! environment overrides on top.

use std::path::{Path, PathBuf};

use thiserror::Error;

use chatrelay_types::config::RelayConfig;
use chatrelay_types::error::RelayError;

pub const CONFIG_FILE_NAME: &str = "chatrelay.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set")]
    MissingSecret { name: String },

    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidOverride {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl From<ConfigError> for RelayError {
    fn from(err: ConfigError) -> Self {
        RelayError::Configuration(err.to_string())
    }
}

/// Pick the configuration file to read.
///
/// An explicit path is used as given. Otherwise `./chatrelay.toml` if it
/// exists, then `{config_dir}/chatrelay/chatrelay.toml` if it exists, then
/// `./chatrelay.toml` (which loads as defaults).
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join("chatrelay").join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// Load configuration from `path`.
///
/// - Missing file: defaults.
/// - Unreadable or malformed file: warning, then defaults.
pub async fn load_relay_config(path: &Path) -> RelayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return RelayConfig::default();
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            RelayConfig::default()
        }
    }
}

/// Apply environment overrides on top of a loaded configuration.
pub fn apply_env_overrides(
    config: &mut RelayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let string_overrides: [(&str, &mut String); 6] = [
        ("AWS_REGION", &mut config.bedrock.region),
        ("BEDROCK_AGENT_ID", &mut config.bedrock.agent_id),
        ("BEDROCK_AGENT_ALIAS_ID", &mut config.bedrock.agent_alias_id),
        ("OPENAI_ASSISTANT_ID", &mut config.openai.assistant_id),
        ("OPENAI_BASE_URL", &mut config.openai.base_url),
        ("CHATRELAY_HOST", &mut config.server.host),
    ];
    for (key, slot) in string_overrides {
        if let Some(value) = lookup(key) {
            tracing::debug!(key, "config value overridden from environment");
            *slot = value;
        }
    }

    if let Some(value) = lookup("CHATRELAY_PORT") {
        config.server.port = value.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidOverride {
                key: "CHATRELAY_PORT",
                value: value.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    Ok(())
}
