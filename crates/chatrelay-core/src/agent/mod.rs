//! Bedrock Agent relay: validate, invoke with the latest utterance, join chunks.

pub mod relay;
pub mod runtime;

pub use relay::{AgentRelay, AgentTurn};
pub use runtime::{AgentRuntime, ChunkStream};
