//! Naloxone Finder API server
//!
//! Thin HTTP front for the AI-backed provider/event search: two search
//! endpoints plus a health check.

use anyhow::{Context, Result};
use server_core::server::build_app;
use server_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Naloxone Finder Server");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Debug: log masked env vars for production troubleshooting
    fn mask_env(name: &str) {
        match std::env::var(name) {
            Ok(val) if val.is_empty() => tracing::info!("  {}: (empty)", name),
            Ok(val) => {
                let show = std::cmp::min(4, val.len());
                tracing::info!(
                    "  {}: {}{}  ({} chars)",
                    name,
                    &val[..show],
                    "*".repeat(val.len().saturating_sub(show)),
                    val.len()
                );
            }
            Err(_) => tracing::warn!("  {}: NOT SET", name),
        }
    }
    tracing::info!("Environment variables:");
    for name in &["PERPLEXITY_API_KEY", "PERPLEXITY_MODEL", "PORT"] {
        mask_env(name);
    }

    let config = Config::from_env()?;
    let app = build_app(&config);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server address")?;
    axum::serve(listener, app)
        .await
        .context("Server exited with error")?;

    Ok(())
}
