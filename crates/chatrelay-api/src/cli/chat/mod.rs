//! Interactive terminal chat against a running relay.
//!
//! Mirrors the web widget: the history starts with a welcome message, every
//! turn posts the whole history to the chosen route, and replies are rendered
//! as markdown. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod client;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
