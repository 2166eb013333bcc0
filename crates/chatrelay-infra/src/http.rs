//! Shared HTTP client construction.

use std::time::Duration;

use chatrelay_types::error::RelayError;

/// Upper bound for a whole upstream exchange, including a streamed agent answer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the reqwest client shared by both upstream clients.
pub fn build_http_client() -> Result<reqwest::Client, RelayError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("chatrelay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RelayError::Internal(format!("failed to create HTTP client: {e}")))
}
