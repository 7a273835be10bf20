//! Kardinal Bridge - HTTP service in front of the Kardinal route optimization API
//!
//! Parses uploaded stop spreadsheets, submits them for optimization and
//! shares the resulting routes over SMS and WhatsApp.

mod config;
mod defaults;
mod error;
mod handlers;
mod services;
mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handlers::AppState;
use services::gateway::KardinalClient;
use services::mapping::create_mapper;
use services::messaging::{create_messenger, Channel};
use services::optimizer::OptimizationService;
use services::workflow::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "bridge.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,kardinal_bridge=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    info!("Starting Kardinal Bridge...");

    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    let gateway = KardinalClient::new(&config.kardinal_url, &config.kardinal_api_key);
    let backend = Arc::new(OptimizationService::new(gateway));
    info!("Kardinal gateway targeting {}", config.kardinal_url);

    let sms = create_messenger(Channel::Sms, config.twilio.as_ref());
    let whatsapp = create_messenger(Channel::WhatsApp, config.twilio.as_ref());

    let state = AppState {
        backend,
        sms,
        whatsapp,
        mapper: create_mapper(&config.column_mapper),
        sessions: Arc::new(SessionStore::new()),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, handlers::router(state)).await?;

    Ok(())
}
