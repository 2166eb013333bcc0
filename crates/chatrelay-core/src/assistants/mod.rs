//! OpenAI Assistants relay: thread, messages, run, poll, extract.

pub mod api;
pub mod extract;
pub mod poll;
pub mod relay;
pub mod run;

pub use api::AssistantsApi;
pub use extract::extract_reply;
pub use poll::PollPolicy;
pub use relay::AssistantRelay;
pub use run::RunPhase;
