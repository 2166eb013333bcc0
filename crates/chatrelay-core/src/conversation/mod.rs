//! Client-side conversation model.
//!
//! Holds the in-memory history a chat client sends to either relay. The
//! history is never persisted; `reset` starts over with a fresh welcome.

pub mod reply;

use chrono::Utc;
use uuid::Uuid;

use chatrelay_types::chat::{ChatMessage, InboundMessage, Role};
use chatrelay_types::relay::{AgentChatRequest, AssistantChatRequest};

pub use reply::{RelayReply, ReplyError, decode_reply};

/// Id of the seeded assistant greeting.
pub const WELCOME_MESSAGE_ID: &str = "welcome-message";

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    session_id: Option<String>,
    welcome: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation that opens with one assistant greeting.
    pub fn welcomed(text: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.welcome = Some(text.into());
        conversation.seed_welcome();
        conversation
    }

    /// Seed the greeting if the history is empty. Returns whether it was added.
    pub fn seed_welcome(&mut self) -> bool {
        match &self.welcome {
            Some(text) if self.messages.is_empty() => {
                self.messages
                    .push(ChatMessage::assistant(WELCOME_MESSAGE_ID, text.clone(), Utc::now()));
                true
            }
            _ => false,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(ChatMessage::user(content))
    }

    /// Append an assistant reply under a fresh client-side id.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(ChatMessage::assistant(
            Uuid::new_v4().to_string(),
            content,
            Utc::now(),
        ))
    }

    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session_id = Some(session_id.into());
    }

    /// True when the last message is an unanswered user turn.
    pub fn awaiting_reply(&self) -> bool {
        self.messages
            .last()
            .is_some_and(|message| message.role == Role::User)
    }

    pub fn to_inbound(&self) -> Vec<InboundMessage> {
        self.messages.iter().map(InboundMessage::from).collect()
    }

    pub fn agent_request(&self) -> AgentChatRequest {
        AgentChatRequest {
            messages: self.to_inbound(),
            session_id: self.session_id.clone(),
        }
    }

    pub fn assistant_request(&self) -> AssistantChatRequest {
        AssistantChatRequest {
            messages: self.to_inbound(),
        }
    }

    /// Drop the history and session, then re-seed the greeting.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.session_id = None;
        self.seed_welcome();
    }
}
