//! Welcome banner display for chat sessions.

use console::style;

use super::client::ChatBackend;

/// Print the banner naming the relay route and server in use.
pub fn print_welcome_banner(backend: ChatBackend, server: &str) {
    println!();
    println!("  * {}", style("epoint.es assistant").cyan().bold());
    println!();
    println!("  {}  {}", style("Backend:").bold(), style(backend).dim());
    println!("  {}   {}", style("Server:").bold(), style(server).dim());
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
