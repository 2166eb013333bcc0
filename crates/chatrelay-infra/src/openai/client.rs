use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};

use chatrelay_core::assistants::AssistantsApi;
use chatrelay_types::assistants::{MessageList, NewRun, NewThreadMessage, Run, Thread};
use chatrelay_types::error::RelayError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "assistants=v2";

/// Assistants v2 client.
///
/// The API key is only exposed when attaching the bearer header.
pub struct OpenAiAssistantsClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiAssistantsClient {
    pub fn new(client: reqwest::Client, api_key: SecretString, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send an authenticated request and decode a successful body.
    ///
    /// Non-2xx answers become [`RelayError::Upstream`] carrying the status and
    /// raw body text.
    async fn send<T: DeserializeOwned>(
        &self,
        stage: &'static str,
        request: RequestBuilder,
    ) -> Result<T, RelayError> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .header(BETA_HEADER, BETA_VALUE)
            .send()
            .await
            .map_err(|e| RelayError::Transport(format!("{stage}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(stage, status = %status, body = %body, "OpenAI API error response");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RelayError::Decode(format!("{stage}: {e}")))
    }
}

// OpenAiAssistantsClient intentionally does NOT derive Debug.

impl AssistantsApi for OpenAiAssistantsClient {
    async fn create_thread(&self) -> Result<Thread, RelayError> {
        let request = self
            .client
            .post(self.url("/threads"))
            .json(&serde_json::json!({}));
        self.send("create thread", request).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        message: &NewThreadMessage,
    ) -> Result<(), RelayError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/messages")))
            .json(message);
        self.send::<IgnoredAny>("add message", request).await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, run: &NewRun) -> Result<Run, RelayError> {
        let request = self
            .client
            .post(self.url(&format!("/threads/{thread_id}/runs")))
            .json(run);
        self.send("create run", request).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, RelayError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{thread_id}/runs/{run_id}")));
        self.send("poll run", request).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<MessageList, RelayError> {
        let request = self
            .client
            .get(self.url(&format!("/threads/{thread_id}/messages")));
        self.send("list messages", request).await
    }
}

#[cfg(test)]
mod tests {
    use chatrelay_types::assistants::RunStatus;
    use chatrelay_types::chat::Role;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> OpenAiAssistantsClient {
        OpenAiAssistantsClient::new(
            reqwest::Client::new(),
            SecretString::from("sk-test"),
            format!("{}/", server.uri()),
        )
    }

    #[tokio::test]
    async fn create_thread_sends_auth_and_beta_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("openai-beta", "assistants=v2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "thread_1", "object": "thread" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let thread = client(&server).create_thread().await.unwrap();
        assert_eq!(thread.id, "thread_1");
    }

    #[tokio::test]
    async fn create_message_posts_role_and_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/messages"))
            .and(body_json(serde_json::json!({ "role": "user", "content": "Hola" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "msg_1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let message = NewThreadMessage {
            role: Role::User,
            content: "Hola".to_string(),
        };
        client(&server)
            .create_message("thread_1", &message)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_and_retrieve_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/thread_1/runs"))
            .and(body_json(serde_json::json!({ "assistant_id": "asst_1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "id": "run_1", "status": "queued", "thread_id": "thread_1" }),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/runs/run_1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "run_1", "status": "completed" })),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let run = client
            .create_run(
                "thread_1",
                &NewRun {
                    assistant_id: "asst_1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Queued);

        let run = client.retrieve_run("thread_1", "run_1").await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn list_messages_decodes_content_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [{
                    "id": "msg_2",
                    "role": "assistant",
                    "created_at": 1_700_000_000,
                    "content": [{ "type": "text", "text": { "value": "Hi", "annotations": [] } }]
                }],
                "has_more": false
            })))
            .mount(&server)
            .await;

        let list = client(&server).list_messages("thread_1").await.unwrap();
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].role, Role::Assistant);
    }

    #[tokio::test]
    async fn error_status_and_body_are_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = client(&server).create_thread().await.unwrap_err();
        match err {
            RelayError::Upstream { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).create_thread().await.unwrap_err();
        assert!(matches!(err, RelayError::Decode(_)));
    }
}
