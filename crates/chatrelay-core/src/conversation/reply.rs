//! The one reply schema the chat client accepts.

use serde::Deserialize;
use thiserror::Error;

use chatrelay_types::chat::ChatMessage;

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply does not match any accepted shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Accepted reply bodies, tried in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RelayReply {
    /// `{id, role, content, createdAt}` from the Assistants route.
    Message(ChatMessage),
    /// `{text}` from the Agent route.
    Text { text: String },
    /// `{message: {content: [blocks]}}`.
    Wrapped { message: WrappedMessage },
    /// `{content}`.
    Content { content: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WrappedMessage {
    pub content: Vec<ReplyBlock>,
}

/// A content block. Blocks without text contribute nothing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplyBlock {
    #[serde(default)]
    pub text: Option<BlockText>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BlockText {
    Plain(String),
    Value { value: String },
}

impl RelayReply {
    pub fn into_text(self) -> String {
        match self {
            RelayReply::Message(message) => message.content,
            RelayReply::Text { text } => text,
            RelayReply::Content { content } => content,
            RelayReply::Wrapped { message } => message
                .content
                .into_iter()
                .filter_map(|block| block.text)
                .map(|text| match text {
                    BlockText::Plain(text) | BlockText::Value { value: text } => text,
                })
                .collect(),
        }
    }
}

/// Decode a reply body to the text to display.
///
/// If the text is itself a JSON object in one of the accepted shapes it is
/// unwrapped once. Deeper nesting is left as is.
pub fn decode_reply(body: &str) -> Result<String, ReplyError> {
    let text = serde_json::from_str::<RelayReply>(body)?.into_text();

    if text.trim_start().starts_with('{') {
        if let Ok(inner) = serde_json::from_str::<RelayReply>(&text) {
            return Ok(inner.into_text());
        }
    }
    Ok(text)
}
