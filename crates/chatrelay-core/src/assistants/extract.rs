use chrono::DateTime;

use chatrelay_types::assistants::{MessageContent, MessageList};
use chatrelay_types::chat::{ChatMessage, Role};
use chatrelay_types::error::RelayError;

/// Pick the newest assistant message and flatten its text blocks.
///
/// The list is expected newest-first, so the first assistant entry wins.
/// Non-text blocks are skipped; text blocks are concatenated with no
/// separator.
pub fn extract_reply(list: &MessageList) -> Result<ChatMessage, RelayError> {
    let message = list
        .data
        .iter()
        .find(|m| m.role == Role::Assistant)
        .ok_or(RelayError::NoAssistantMessage)?;

    let content: String = message
        .content
        .iter()
        .filter_map(|block| match block {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Unsupported => None,
        })
        .collect();

    let created_at = DateTime::from_timestamp(message.created_at, 0).ok_or_else(|| {
        RelayError::Decode(format!(
            "message {} has out-of-range created_at {}",
            message.id, message.created_at
        ))
    })?;

    Ok(ChatMessage::assistant(&message.id, content, created_at))
}
