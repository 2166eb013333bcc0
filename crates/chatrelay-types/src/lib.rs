//! Shared domain and wire types for the chat relay.
//!
//! Contains the chat message model consumed by the widget, the request and
//! reply bodies of both relay routes, the upstream payload shapes of the
//! Bedrock Agent Runtime and OpenAI Assistants APIs, the relay configuration,
//! and the relay error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod assistants;
pub mod chat;
pub mod config;
pub mod error;
pub mod relay;
