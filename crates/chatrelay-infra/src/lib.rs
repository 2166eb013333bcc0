//! Infrastructure layer for the chat relay.
//!
//! Contains the reqwest-backed implementations of the provider traits defined
//! in `chatrelay-core` (Bedrock Agent Runtime, OpenAI Assistants v2), plus
//! configuration loading and environment credential resolution.

pub mod bedrock;
pub mod config;
pub mod credentials;
pub mod http;
pub mod openai;
