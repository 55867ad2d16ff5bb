//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use perplexity_client::PerplexityClient;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{health_handler, search_handler, search_stream_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// None when no credential is configured; requests then get the
    /// generic configuration error instead of the server failing to boot.
    pub client: Option<Arc<PerplexityClient>>,
    pub model: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: config
                .perplexity_api_key
                .as_ref()
                .map(|key| Arc::new(PerplexityClient::new(key))),
            model: config.perplexity_model.clone(),
        }
    }
}

/// Build the Axum application router
pub fn build_app(config: &Config) -> Router {
    let app_state = AppState::from_config(config);

    if app_state.client.is_none() {
        tracing::warn!("PERPLEXITY_API_KEY not set - searches will fail with a config error");
    }

    // CORS configuration - the search form may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Rate limiting on the search endpoints: every request fans out to a
    // metered upstream API, so per-IP throttling with a small burst
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .use_headers() // Extract IP from X-Forwarded-For header
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let api = Router::new()
        .route("/api/search", post(search_handler))
        .route("/api/search-stream", post(search_stream_handler))
        .layer(rate_limit_layer);

    api
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
