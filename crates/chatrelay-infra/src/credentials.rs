//! Environment credential resolution.
//!
//! Secrets are read only from the environment and wrapped in
//! [`SecretString`] immediately, so they never reach `Debug` output or logs.
//!
//! Lookups go through a `Fn(&str) -> Option<String>` so callers (and tests)
//! can substitute the process environment.

use secrecy::SecretString;

use crate::config::ConfigError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const AWS_BEARER_TOKEN_BEDROCK: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Prefix carried by Bedrock API keys as issued by the console.
const BEDROCK_KEY_PREFIX: &str = "bedrock-api-key-";

/// Read a process environment variable, treating empty and non-Unicode
/// values as unset.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Static AWS credentials for SigV4 signing.
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
}

/// How requests to the Bedrock Agent Runtime are authenticated.
pub enum AgentAuth {
    /// Bedrock API key sent as a bearer token.
    Bearer(SecretString),
    /// Access key pair, requests signed with SigV4.
    SigV4(AwsCredentials),
}

impl AgentAuth {
    pub fn scheme(&self) -> &'static str {
        match self {
            AgentAuth::Bearer(_) => "bearer",
            AgentAuth::SigV4(_) => "sigv4",
        }
    }
}

// AwsCredentials and AgentAuth intentionally do NOT derive Debug.

pub fn openai_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<SecretString, ConfigError> {
    lookup(OPENAI_API_KEY)
        .map(SecretString::from)
        .ok_or(ConfigError::MissingSecret {
            name: OPENAI_API_KEY.to_string(),
        })
}

/// Resolve Bedrock credentials.
///
/// A bearer token wins over an access key pair. The console's
/// `bedrock-api-key-` prefix is stripped from the token.
pub fn bedrock_auth(lookup: impl Fn(&str) -> Option<String>) -> Result<AgentAuth, ConfigError> {
    if let Some(token) = lookup(AWS_BEARER_TOKEN_BEDROCK) {
        let token = token
            .strip_prefix(BEDROCK_KEY_PREFIX)
            .map(str::to_string)
            .unwrap_or(token);
        return Ok(AgentAuth::Bearer(SecretString::from(token)));
    }

    match (lookup(AWS_ACCESS_KEY_ID), lookup(AWS_SECRET_ACCESS_KEY)) {
        (Some(access_key_id), Some(secret)) => Ok(AgentAuth::SigV4(AwsCredentials {
            access_key_id,
            secret_access_key: SecretString::from(secret),
            session_token: lookup(AWS_SESSION_TOKEN).map(SecretString::from),
        })),
        _ => Err(ConfigError::MissingSecret {
            name: format!("{AWS_BEARER_TOKEN_BEDROCK} or {AWS_ACCESS_KEY_ID}/{AWS_SECRET_ACCESS_KEY}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn openai_key_is_read_from_env() {
        let key = openai_api_key(env(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(key.expose_secret(), "sk-test");
    }

    #[test]
    fn missing_openai_key_names_the_variable() {
        let err = openai_api_key(env(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn bearer_token_wins_and_loses_its_prefix() {
        let auth = bedrock_auth(env(&[
            ("AWS_BEARER_TOKEN_BEDROCK", "bedrock-api-key-abc123"),
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]))
        .unwrap();

        match auth {
            AgentAuth::Bearer(token) => assert_eq!(token.expose_secret(), "abc123"),
            AgentAuth::SigV4(_) => panic!("expected bearer auth"),
        }
    }

    #[test]
    fn access_key_pair_selects_sigv4() {
        let auth = bedrock_auth(env(&[
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "token"),
        ]))
        .unwrap();

        assert_eq!(auth.scheme(), "sigv4");
        let AgentAuth::SigV4(credentials) = auth else {
            unreachable!()
        };
        assert_eq!(credentials.access_key_id, "AKID");
        assert_eq!(
            credentials.session_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("token".to_string())
        );
    }

    #[test]
    fn half_a_key_pair_is_missing_credentials() {
        let result = bedrock_auth(env(&[("AWS_ACCESS_KEY_ID", "AKID")]));
        assert!(matches!(result, Err(ConfigError::MissingSecret { .. })));
    }
}
