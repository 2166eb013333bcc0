//! Main chat loop orchestration.
//!
//! Seeds the welcome message, reads lines, relays the whole history on each
//! turn and renders the reply. Nothing is persisted; `/new` starts over.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use chatrelay_core::conversation::Conversation;
use chatrelay_infra::http::build_http_client;
use chatrelay_types::chat::Role;
use chatrelay_types::config::RelayConfig;

use super::banner::print_welcome_banner;
use super::client::{ChatBackend, RelayClient};
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

const HISTORY_PREVIEW_CHARS: usize = 100;

/// Run the interactive chat loop against `server` (or `widget.server_url`).
pub async fn run_chat_loop(
    config: &RelayConfig,
    backend: ChatBackend,
    server: Option<String>,
) -> anyhow::Result<()> {
    let server = server.unwrap_or_else(|| config.widget.server_url.clone());
    let client = RelayClient::new(build_http_client()?, &server, backend);
    let renderer = ChatRenderer::new();

    print_welcome_banner(client.backend(), &server);

    let mut conversation = Conversation::welcomed(config.widget.welcome_message.clone());
    print_history(&renderer, &conversation);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => {
                            commands::print_help();
                            continue;
                        }
                        ChatCommand::Clear => {
                            chat_input.clear();
                            continue;
                        }
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::New => {
                            conversation.reset();
                            info!("conversation reset");
                            println!("\n  {}\n", style("New conversation.").dim());
                            print_history(&renderer, &conversation);
                            continue;
                        }
                        ChatCommand::History => {
                            print_history_preview(&conversation);
                            continue;
                        }
                        ChatCommand::Retry => {
                            if !conversation.awaiting_reply() {
                                println!("\n  {}\n", style("Nothing to retry.").dim());
                                continue;
                            }
                        }
                        ChatCommand::Unknown(cmd_name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(cmd_name).dim()
                            );
                            continue;
                        }
                    }
                } else {
                    chat_input.remember(&text);
                    conversation.push_user(text);
                }

                exchange(&client, &mut conversation, &renderer).await;
            }
        }
    }

    Ok(())
}

/// Relay the conversation once and render the outcome.
///
/// A failed turn leaves the user message in place so `/retry` can resend it.
async fn exchange(client: &RelayClient, conversation: &mut Conversation, renderer: &ChatRenderer) {
    let spinner = thinking_spinner();
    let result = client.send(conversation).await;
    spinner.finish_and_clear();

    match result {
        Ok(turn) => {
            if let Some(session_id) = turn.session_id {
                conversation.set_session_id(session_id);
            }
            let reply = conversation.push_assistant(turn.text);
            print_assistant(renderer, &reply.content);
        }
        Err(e) => {
            warn!(error = %e, backend = %client.backend(), "relay turn failed");
            eprintln!(
                "\n  {} An error occurred. Please try again.",
                style("!").red().bold()
            );
            eprintln!("  {}\n", style("Type /retry to resend, /exit to quit.").dim());
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn print_assistant(renderer: &ChatRenderer, content: &str) {
    println!();
    println!("  {}", style("Assistant").cyan().bold());
    println!("  {}", renderer.render(content).trim());
    println!();
}

fn print_history(renderer: &ChatRenderer, conversation: &Conversation) {
    for message in conversation.messages() {
        match message.role {
            Role::Assistant => print_assistant(renderer, &message.content),
            Role::User => println!("  {} {}", style("You >").green().bold(), message.content),
        }
    }
}

fn print_history_preview(conversation: &Conversation) {
    println!();
    for message in conversation.messages() {
        let label = match message.role {
            Role::User => style("You").green(),
            Role::Assistant => style("Assistant").cyan(),
        };
        println!("  {} {}", label.bold(), preview(&message.content));
    }
    println!();
}

/// First `HISTORY_PREVIEW_CHARS` characters, with an ellipsis when cut.
fn preview(content: &str) -> String {
    if content.chars().count() > HISTORY_PREVIEW_CHARS {
        let head: String = content.chars().take(HISTORY_PREVIEW_CHARS - 3).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}
