//! HTTP request handlers for the relay routes.

pub mod agent;
pub mod assistants;
