//! Chat relay service and terminal chat client.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, loads configuration, then either serves the relay
//! routes or opens an interactive chat against a running relay.

mod cli;
mod http;
mod state;

use std::path::Path;

use clap::Parser;
use clap_complete::generate;

use chatrelay_infra::config::{apply_env_overrides, load_relay_config, resolve_config_path};
use chatrelay_infra::credentials::env_lookup;
use chatrelay_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use chatrelay_types::config::RelayConfig;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)?;

    let result = run(cli).await;

    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        // Shell completions don't need configuration
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "chatrelay", &mut std::io::stdout());
            Ok(())
        }
        Commands::Serve { port, host } => {
            let config = load_config(cli.config.as_deref()).await?;
            serve(config, host, port).await
        }
        Commands::Chat { backend, server } => {
            let config = load_config(cli.config.as_deref()).await?;
            cli::chat::loop_runner::run_chat_loop(&config, backend, server).await
        }
    }
}

/// Read the configuration file, then apply environment overrides.
async fn load_config(explicit: Option<&Path>) -> anyhow::Result<RelayConfig> {
    let config_path = resolve_config_path(explicit);
    let mut config = load_relay_config(&config_path).await;
    apply_env_overrides(&mut config, env_lookup)?;
    Ok(config)
}

async fn serve(mut config: RelayConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::init(config, env_lookup)?;
    let backends = [
        ("bedrock", state.agent.is_ready()),
        ("openai", state.assistants.is_ready()),
    ];

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Chat relay listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    for (name, ready) in backends {
        let mark = if ready {
            console::style("✓").green()
        } else {
            console::style("✗").red()
        };
        println!("  {mark} {name}");
    }
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completions_run_without_loading_config() {
        let cli = Cli::try_parse_from([
            "chatrelay",
            "--config",
            "/nonexistent/chatrelay.toml",
            "completions",
            "bash",
        ])
        .unwrap();
        assert!(run(cli).await.is_ok());
    }
}
