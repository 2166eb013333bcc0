//! AWS Bedrock Agent Runtime client.
//!
//! Implements [`AgentRuntime`](chatrelay_core::agent::AgentRuntime) over the
//! `InvokeAgent` REST call, authenticated with a bearer token or SigV4, and
//! decodes the AWS event stream binary protocol without the AWS SDK.

mod client;
pub mod sigv4;
mod streaming;

pub use client::BedrockAgentClient;
