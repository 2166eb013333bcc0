//! POST /api/openai -- replay the conversation into an assistant thread.
//!
//! Answers the assistant's newest message as `{ id, role, content, createdAt }`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use chatrelay_types::chat::ChatMessage;
use chatrelay_types::relay::AssistantChatRequest;

use crate::http::error::AppError;
use crate::state::AppState;

pub async fn run_assistant(
    State(state): State<AppState>,
    body: Result<Json<AssistantChatRequest>, JsonRejection>,
) -> Result<Json<ChatMessage>, AppError> {
    let Json(request) = body?;
    let relay = state.assistants.get()?;

    let reply = relay.relay(&request.messages).await?;
    Ok(Json(reply))
}
