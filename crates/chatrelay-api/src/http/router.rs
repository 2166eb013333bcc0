//! Axum router configuration with middleware.
//!
//! Routes: `POST /api/aws-bedrock`, `POST /api/openai`, `GET /health`.
//! Middleware: CORS (any origin, `x-session-id` exposed), request tracing.
//!
//! When `server.web_dir` is configured and exists, the widget's static
//! assets are served for all other paths, falling back to `index.html`.

use axum::Router;
use axum::extract::State;
use axum::http::HeaderName;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::http::handlers::agent::SESSION_ID_HEADER;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SESSION_ID_HEADER)]);

    let api_routes = Router::new()
        .route("/aws-bedrock", post(handlers::agent::invoke_agent))
        .route("/openai", post(handlers::assistants::run_assistant));

    let web_dir = state.config.server.web_dir.clone();

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(web_dir) = web_dir {
        if std::path::Path::new(&web_dir).exists() {
            let index_path = format!("{web_dir}/index.html");
            let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
            router = router.fallback_service(serve_dir);
            tracing::info!(path = %web_dir, "static widget serving enabled");
        } else {
            tracing::warn!(path = %web_dir, "web_dir does not exist, serving API only");
        }
    }

    router
}

/// GET /health - liveness plus which relays are configured.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backends": {
            "bedrock": state.agent.is_ready(),
            "openai": state.assistants.is_ready(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use chatrelay_types::config::RelayConfig;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("AWS_BEARER_TOKEN_BEDROCK", "bedrock-token"),
        ])
    }

    fn config(upstream: &MockServer) -> RelayConfig {
        let mut config = RelayConfig::default();
        config.openai.base_url = upstream.uri();
        config.openai.poll_interval_ms = 0;
        config.openai.max_poll_attempts = 3;
        config.bedrock.endpoint = Some(upstream.uri());
        config
    }

    fn router(config: RelayConfig, lookup: impl Fn(&str) -> Option<String>) -> Router {
        build_router(AppState::init(config, lookup).unwrap())
    }

    async fn post_json(router: Router, uri: &str, body: String) -> (StatusCode, Option<String>, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let session = response
            .headers()
            .get(SESSION_ID_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, session, serde_json::from_slice(&bytes).unwrap())
    }

    /// One `chunk` event frame, CRCs zeroed.
    fn chunk_frame(text: &str) -> Vec<u8> {
        let payload = json!({
            "bytes": base64::engine::general_purpose::STANDARD.encode(text)
        })
        .to_string();

        let mut headers = Vec::new();
        for (name, value) in [(":event-type", "chunk"), (":message-type", "event")] {
            headers.push(name.len() as u8);
            headers.extend_from_slice(name.as_bytes());
            headers.push(7);
            headers.extend_from_slice(&(value.len() as u16).to_be_bytes());
            headers.extend_from_slice(value.as_bytes());
        }

        let total = 12 + headers.len() + payload.len() + 4;
        let mut frame = Vec::with_capacity(total);
        frame.extend_from_slice(&(total as u32).to_be_bytes());
        frame.extend_from_slice(&(headers.len() as u32).to_be_bytes());
        frame.extend_from_slice(&[0; 4]);
        frame.extend_from_slice(&headers);
        frame.extend_from_slice(payload.as_bytes());
        frame.extend_from_slice(&[0; 4]);
        frame
    }

    fn conversation() -> Value {
        json!([
            { "id": "welcome-message", "role": "assistant", "content": "¡Hola!", "createdAt": "2025-01-01T00:00:00.000Z" },
            { "id": "u1", "role": "user", "content": "¿Qué hacéis?", "createdAt": "2025-01-01T00:00:05.000Z" }
        ])
    }

    async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate, times: u64) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(response)
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn health_reports_configured_backends() {
        let upstream = MockServer::start().await;
        let router = router(config(&upstream), env(&[("OPENAI_API_KEY", "sk-test")]));

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backends"]["openai"], true);
        assert_eq!(body["backends"]["bedrock"], false);
    }

    #[tokio::test]
    async fn openai_route_relays_conversation_and_returns_reply() {
        let upstream = MockServer::start().await;
        mount(&upstream, "POST", "/threads", ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1" })), 1).await;
        mount(&upstream, "POST", "/threads/thread_1/messages", ResponseTemplate::new(200).set_body_json(json!({ "id": "m" })), 2).await;
        mount(&upstream, "POST", "/threads/thread_1/runs", ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "queued" })), 1).await;
        mount(&upstream, "GET", "/threads/thread_1/runs/run_1", ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "completed" })), 1).await;
        mount(
            &upstream,
            "GET",
            "/threads/thread_1/messages",
            ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "id": "msg_a", "role": "assistant", "created_at": 1_700_000_000,
                      "content": [{ "type": "text", "text": { "value": "Desarrollo web." } }] },
                    { "id": "msg_u", "role": "user", "created_at": 1_699_999_999,
                      "content": [{ "type": "text", "text": { "value": "¿Qué hacéis?" } }] }
                ]
            })),
            1,
        )
        .await;

        let body = json!({ "messages": conversation() }).to_string();
        let (status, _, reply) = post_json(router(config(&upstream), full_env()), "/api/openai", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            reply,
            json!({
                "id": "msg_a",
                "role": "assistant",
                "content": "Desarrollo web.",
                "createdAt": "2023-11-14T22:13:20.000Z"
            })
        );
    }

    #[tokio::test]
    async fn openai_upstream_failure_keeps_status_and_body() {
        let upstream = MockServer::start().await;
        mount(&upstream, "POST", "/threads", ResponseTemplate::new(401).set_body_string("Incorrect API key provided"), 1).await;

        let body = json!({ "messages": conversation() }).to_string();
        let (status, _, reply) = post_json(router(config(&upstream), full_env()), "/api/openai", body).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply, json!({ "error": "Incorrect API key provided" }));
    }

    #[tokio::test]
    async fn openai_run_that_never_completes_reports_last_status() {
        let upstream = MockServer::start().await;
        mount(&upstream, "POST", "/threads", ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1" })), 1).await;
        mount(&upstream, "POST", "/threads/thread_1/messages", ResponseTemplate::new(200).set_body_json(json!({})), 2).await;
        mount(&upstream, "POST", "/threads/thread_1/runs", ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "queued" })), 1).await;
        mount(&upstream, "GET", "/threads/thread_1/runs/run_1", ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "in_progress" })), 3).await;
        mount(&upstream, "GET", "/threads/thread_1/messages", ResponseTemplate::new(200).set_body_json(json!({ "data": [] })), 0).await;

        let body = json!({ "messages": conversation() }).to_string();
        let (status, _, reply) = post_json(router(config(&upstream), full_env()), "/api/openai", body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply, json!({ "error": "Run did not succeed", "status": "in_progress" }));
    }

    #[tokio::test]
    async fn openai_thread_without_reply_is_not_found() {
        let upstream = MockServer::start().await;
        mount(&upstream, "POST", "/threads", ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1" })), 1).await;
        mount(&upstream, "POST", "/threads/thread_1/runs", ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "completed" })), 1).await;
        mount(&upstream, "GET", "/threads/thread_1/messages", ResponseTemplate::new(200).set_body_json(json!({ "data": [] })), 1).await;

        let body = json!({ "messages": [] }).to_string();
        let (status, _, reply) = post_json(router(config(&upstream), full_env()), "/api/openai", body).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(reply, json!({ "error": "No assistant message found" }));
    }

    #[tokio::test]
    async fn openai_route_without_key_is_a_configuration_error() {
        let upstream = MockServer::start().await;
        let body = json!({ "messages": conversation() }).to_string();
        let (status, _, reply) = post_json(router(config(&upstream), env(&[])), "/api/openai", body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(reply["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn bedrock_route_joins_chunks_and_echoes_session() {
        let upstream = MockServer::start().await;
        let frames = [chunk_frame("Hacemos "), chunk_frame("desarrollo web.")].concat();
        mount(
            &upstream,
            "POST",
            "/agents/SS2ALX2HQ3/agentAliases/LY6OCPKYDK/sessions/sess-42/text",
            ResponseTemplate::new(200).set_body_raw(frames, "application/vnd.amazon.eventstream"),
            1,
        )
        .await;

        let body = json!({ "messages": conversation(), "sessionId": "sess-42" }).to_string();
        let (status, session, reply) = post_json(router(config(&upstream), full_env()), "/api/aws-bedrock", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, json!({ "text": "Hacemos desarrollo web." }));
        assert_eq!(session.as_deref(), Some("sess-42"));
    }

    #[tokio::test]
    async fn bedrock_route_rejects_invalid_turns_without_upstream_calls() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&upstream)
            .await;

        let (status, _, reply) = post_json(
            router(config(&upstream), full_env()),
            "/api/aws-bedrock",
            json!({ "messages": [] }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply, json!({ "error": "No messages provided." }));

        let (status, _, reply) = post_json(
            router(config(&upstream), full_env()),
            "/api/aws-bedrock",
            json!({ "messages": [{ "role": "assistant", "content": "Hi" }] }).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            reply,
            json!({ "error": "The last message must be a user message with content." })
        );
    }

    #[tokio::test]
    async fn bedrock_null_content_gets_the_validation_message() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&upstream)
            .await;

        let body = json!({ "messages": [{ "role": "user", "content": null }] }).to_string();
        let (status, _, reply) = post_json(router(config(&upstream), full_env()), "/api/aws-bedrock", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            reply,
            json!({ "error": "The last message must be a user message with content." })
        );
    }

    #[tokio::test]
    async fn epoch_millis_created_at_is_accepted() {
        let upstream = MockServer::start().await;
        mount(
            &upstream,
            "POST",
            "/agents/SS2ALX2HQ3/agentAliases/LY6OCPKYDK/sessions/sess-7/text",
            ResponseTemplate::new(200)
                .set_body_raw(chunk_frame("ok"), "application/vnd.amazon.eventstream"),
            1,
        )
        .await;

        let body = json!({
            "messages": [{ "role": "user", "content": "hi", "createdAt": 1_735_689_600_000_i64 }],
            "sessionId": "sess-7"
        })
        .to_string();
        let (status, _, reply) = post_json(router(config(&upstream), full_env()), "/api/aws-bedrock", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, json!({ "text": "ok" }));
    }

    #[tokio::test]
    async fn bedrock_upstream_error_is_a_server_error_with_message() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "message": "Agent alias not found" })),
            )
            .mount(&upstream)
            .await;

        let body = json!({ "messages": conversation() }).to_string();
        let (status, _, reply) = post_json(router(config(&upstream), full_env()), "/api/aws-bedrock", body).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply, json!({ "error": "Agent alias not found" }));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let upstream = MockServer::start().await;
        for route in ["/api/aws-bedrock", "/api/openai"] {
            let (status, _, reply) =
                post_json(router(config(&upstream), full_env()), route, "{not json".to_string()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "route {route}");
            assert!(reply["error"].is_string());
        }
    }
}
