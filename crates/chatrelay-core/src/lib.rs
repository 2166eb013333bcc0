//! Relay orchestration and provider port traits for the chat relay.
//!
//! This crate defines the "ports" (provider traits) that the infrastructure
//! layer implements, the two relays built on them, and the client-side
//! conversation model. It depends only on `chatrelay-types` -- never on
//! `chatrelay-infra` or any HTTP crate.

pub mod agent;
pub mod assistants;
pub mod conversation;
