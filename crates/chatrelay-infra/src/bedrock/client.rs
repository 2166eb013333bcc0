//! BedrockAgentClient -- concrete [`AgentRuntime`] for the Bedrock Agent Runtime.
//!
//! Calls `InvokeAgent` over plain HTTPS. Credentials are held as
//! [`SecretString`](secrecy::SecretString) and are only exposed while
//! building request headers.

use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;

use chatrelay_core::agent::{AgentRuntime, ChunkStream};
use chatrelay_types::agent::{AgentExceptionPayload, InvokeAgentRequest};
use chatrelay_types::config::BedrockConfig;
use chatrelay_types::error::RelayError;

use super::sigv4::{sign_request, uri_encode};
use super::streaming::agent_chunk_stream;
use crate::credentials::AgentAuth;

const EVENT_STREAM_CONTENT_TYPE: &str = "application/vnd.amazon.eventstream";
const SIGNING_SERVICE: &str = "bedrock";

pub struct BedrockAgentClient {
    client: reqwest::Client,
    auth: AgentAuth,
    endpoint: String,
    region: String,
    agent_id: String,
    agent_alias_id: String,
    enable_trace: bool,
}

impl BedrockAgentClient {
    pub fn new(client: reqwest::Client, config: &BedrockConfig, auth: AgentAuth) -> Self {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-agent-runtime.{}.amazonaws.com", config.region));

        Self {
            client,
            auth,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            region: config.region.clone(),
            agent_id: config.agent_id.clone(),
            agent_alias_id: config.agent_alias_id.clone(),
            enable_trace: config.enable_trace,
        }
    }

    fn invoke_url(&self, session_id: &str) -> Result<reqwest::Url, RelayError> {
        let url = format!(
            "{}/agents/{}/agentAliases/{}/sessions/{}/text",
            self.endpoint,
            uri_encode(&self.agent_id),
            uri_encode(&self.agent_alias_id),
            uri_encode(session_id),
        );
        reqwest::Url::parse(&url).map_err(|e| RelayError::Configuration(format!("invalid Bedrock endpoint {url}: {e}")))
    }
}

// BedrockAgentClient intentionally does NOT derive Debug to prevent
// accidental exposure of credentials.

impl AgentRuntime for BedrockAgentClient {
    async fn invoke(
        &self,
        session_id: &str,
        input_text: &str,
    ) -> Result<Option<ChunkStream>, RelayError> {
        let url = self.invoke_url(session_id)?;
        let body = serde_json::to_vec(&InvokeAgentRequest {
            input_text: input_text.to_string(),
            enable_trace: self.enable_trace,
            end_session: false,
        })
        .map_err(|e| RelayError::Internal(format!("failed to encode InvokeAgent body: {e}")))?;

        tracing::debug!(
            url = %url,
            agent_id = %self.agent_id,
            region = %self.region,
            auth = self.auth.scheme(),
            "Bedrock InvokeAgent request"
        );

        let mut request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE);
        match &self.auth {
            AgentAuth::Bearer(token) => {
                request = request.bearer_auth(token.expose_secret());
            }
            AgentAuth::SigV4(credentials) => {
                let signed = sign_request(
                    credentials,
                    &self.region,
                    SIGNING_SERVICE,
                    "POST",
                    &url,
                    &body,
                    Utc::now(),
                )?;
                for (name, value) in signed {
                    request = request.header(name, value);
                }
            }
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| RelayError::Agent(format!("Bedrock request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, "Bedrock InvokeAgent error response");
            let message = serde_json::from_str::<AgentExceptionPayload>(&error_body)
                .ok()
                .and_then(|payload| payload.message)
                .unwrap_or_else(|| format!("Bedrock Agent Runtime returned HTTP {status}"));
            return Err(RelayError::Agent(message));
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(EVENT_STREAM_CONTENT_TYPE));
        if !is_event_stream {
            tracing::warn!(status = %status, "Bedrock response carried no event stream");
            return Ok(None);
        }

        Ok(Some(agent_chunk_stream(response.bytes_stream())))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use secrecy::SecretString;
    use wiremock::matchers::{body_json, header, header_exists, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::bedrock::streaming::{chunk_frame, encode_frame};
    use crate::credentials::AwsCredentials;

    const INVOKE_PATH: &str = "/agents/SS2ALX2HQ3/agentAliases/LY6OCPKYDK/sessions/sess-1/text";

    fn config(endpoint: &str) -> BedrockConfig {
        BedrockConfig {
            endpoint: Some(endpoint.to_string()),
            ..BedrockConfig::default()
        }
    }

    fn bearer_client(endpoint: &str) -> BedrockAgentClient {
        BedrockAgentClient::new(
            reqwest::Client::new(),
            &config(endpoint),
            AgentAuth::Bearer(SecretString::from("token-123")),
        )
    }

    async fn drain(stream: ChunkStream) -> Result<String, RelayError> {
        let mut stream = stream;
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend(chunk?);
        }
        Ok(String::from_utf8(out).unwrap())
    }

    fn event_stream(frames: Vec<Vec<u8>>) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(frames.concat(), EVENT_STREAM_CONTENT_TYPE)
    }

    #[test]
    fn default_endpoint_follows_region() {
        let config = BedrockConfig {
            region: "eu-west-1".to_string(),
            ..BedrockConfig::default()
        };
        let client = BedrockAgentClient::new(
            reqwest::Client::new(),
            &config,
            AgentAuth::Bearer(SecretString::from("t")),
        );
        assert_eq!(
            client.invoke_url("abc").unwrap().as_str(),
            "https://bedrock-agent-runtime.eu-west-1.amazonaws.com/agents/SS2ALX2HQ3/agentAliases/LY6OCPKYDK/sessions/abc/text"
        );
    }

    #[tokio::test]
    async fn streams_chunks_with_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .and(header("authorization", "Bearer token-123"))
            .and(body_json(serde_json::json!({
                "inputText": "¿Qué servicios ofrecéis?",
                "enableTrace": false,
                "endSession": false
            })))
            .respond_with(event_stream(vec![chunk_frame("Desarrollo web "), chunk_frame("y marketing.")]))
            .expect(1)
            .mount(&server)
            .await;

        let stream = bearer_client(&server.uri())
            .invoke("sess-1", "¿Qué servicios ofrecéis?")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(drain(stream).await.unwrap(), "Desarrollo web y marketing.");
    }

    #[tokio::test]
    async fn signs_requests_with_sigv4() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(INVOKE_PATH))
            .and(header_regex(
                "authorization",
                r"^AWS4-HMAC-SHA256 Credential=AKID/\d{8}/us-east-1/bedrock/aws4_request, SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature=[0-9a-f]{64}$",
            ))
            .and(header_exists("x-amz-date"))
            .and(header_exists("x-amz-content-sha256"))
            .respond_with(event_stream(vec![chunk_frame("ok")]))
            .expect(1)
            .mount(&server)
            .await;

        let client = BedrockAgentClient::new(
            reqwest::Client::new(),
            &config(&server.uri()),
            AgentAuth::SigV4(AwsCredentials {
                access_key_id: "AKID".to_string(),
                secret_access_key: SecretString::from("secret"),
                session_token: None,
            }),
        );

        let stream = client.invoke("sess-1", "hi").await.unwrap().unwrap();
        assert_eq!(drain(stream).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn error_status_surfaces_upstream_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({ "message": "The security token included in the request is invalid." })),
            )
            .mount(&server)
            .await;

        let err = match bearer_client(&server.uri()).invoke("sess-1", "hi").await {
            Err(err) => err,
            Ok(_) => panic!("expected an error"),
        };
        assert!(
            matches!(err, RelayError::Agent(ref m) if m == "The security token included in the request is invalid.")
        );
    }

    #[tokio::test]
    async fn non_event_stream_response_has_no_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let result = bearer_client(&server.uri()).invoke("sess-1", "hi").await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn exception_frame_mid_stream_fails_the_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(event_stream(vec![
                chunk_frame("partial"),
                encode_frame(
                    &[(":message-type", "exception"), (":exception-type", "dependencyFailedException")],
                    br#"{"message":"Lambda failed"}"#,
                ),
            ]))
            .mount(&server)
            .await;

        let stream = bearer_client(&server.uri())
            .invoke("sess-1", "hi")
            .await
            .unwrap()
            .unwrap();
        let err = drain(stream).await.unwrap_err();
        assert!(matches!(err, RelayError::Agent(ref m) if m == "Lambda failed"));
    }
}
