//! POST /api/aws-bedrock -- relay the latest user turn to the Bedrock agent.
//!
//! Answers `{ "text": "..." }`. The session the turn ran in is returned in
//! the `x-session-id` header so clients can continue it.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};

use chatrelay_types::relay::{AgentChatReply, AgentChatRequest};

use crate::http::error::AppError;
use crate::state::AppState;

pub const SESSION_ID_HEADER: &str = "x-session-id";

pub async fn invoke_agent(
    State(state): State<AppState>,
    body: Result<Json<AgentChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body?;
    let relay = state.agent.get()?;

    let turn = relay.relay(request).await?;

    let mut response = Json(AgentChatReply { text: turn.text }).into_response();
    if let Ok(value) = HeaderValue::from_str(&turn.session_id) {
        response.headers_mut().insert(SESSION_ID_HEADER, value);
    }
    Ok(response)
}
