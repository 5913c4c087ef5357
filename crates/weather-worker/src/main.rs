//! weather-worker
//!
//! A worker agent that answers delegated weather questions using the
//! National Weather Service API.
//!
//! - `weather-worker` / `weather-worker serve`: NLIP-style envelopes over
//!   HTTP and WebSocket, one session per connection.
//! - `weather-worker standalone`: interactive console chat.

mod cli;
mod config;
mod envelope;
mod factory;
mod handlers;
mod standalone;
mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentFactory, SessionRegistry};
use weather_tools::{NwsClient, WeatherClient};

use crate::cli::Command;
use crate::config::WorkerConfig;
use crate::factory::WeatherAgentFactory;
use crate::standalone::StandaloneChat;
use crate::state::{AppState, ServiceInfo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::parse();
    let command = args.command.unwrap_or_default();

    // Load environment
    dotenvy::dotenv().ok();

    init_tracing(command);

    let config = WorkerConfig::from_env()?;
    let weather: Arc<dyn WeatherClient> = Arc::new(
        NwsClient::new(config.nws.clone()).context("Failed to create weather client")?,
    );
    let factory = Arc::new(WeatherAgentFactory::openrouter(config, weather));

    match command {
        Command::Serve => serve(factory).await,
        Command::Standalone => run_standalone(&factory).await,
    }
}

fn init_tracing(command: Command) {
    let default_filter = match command {
        Command::Serve => "info,tower_http=debug",
        // Keep the console readable
        Command::Standalone => "warn",
    };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(factory: Arc<WeatherAgentFactory>) -> anyhow::Result<()> {
    let config = factory.config().clone();
    let info = Arc::new(ServiceInfo {
        model: config.model.clone(),
        tools: factory.tool_names(),
    });

    tracing::info!("Registered {} tools:", info.tools.len());
    for name in &info.tools {
        tracing::info!("  • {}", name);
    }

    let registry = SessionRegistry::new(factory);
    let app = handlers::router(AppState {
        registry: registry.clone(),
        info,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🌦  weather-worker running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!(model = %config.model, max_rounds = config.max_rounds, "Agent settings");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health              - Health check");
    tracing::info!("  POST   /nlip/               - One-shot envelope exchange");
    tracing::info!("  GET    /nlip/ws             - WebSocket, one session per connection");
    tracing::info!("  POST   /sessions            - Create a session");
    tracing::info!("  POST   /sessions/{{id}}/nlip  - Envelope exchange on a session");
    tracing::info!("  DELETE /sessions/{{id}}       - Destroy a session");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn run_standalone(factory: &WeatherAgentFactory) -> anyhow::Result<()> {
    // A missing credential ends here, before the prompt is shown
    let agent = factory.build()?;

    let mut chat = StandaloneChat::new(agent);
    standalone::run_loop(
        &mut chat,
        standalone::stdin_lines(),
        tokio::io::stdout(),
        shutdown_signal(),
    )
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
