//! OpenAI Assistants API (v2) client.
//!
//! Implements [`AssistantsApi`](chatrelay_core::assistants::AssistantsApi)
//! with plain reqwest calls so upstream status codes and error bodies reach
//! the caller unchanged.

mod client;

pub use client::{DEFAULT_BASE_URL, OpenAiAssistantsClient};
