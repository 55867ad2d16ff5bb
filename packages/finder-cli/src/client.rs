//! Blocking API client for the finder server.

use anyhow::{bail, Context, Result};
use finder_core::{ResultEntry, SearchQuery};
use serde::Deserialize;

/// Successful response of `POST /api/search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<ResultEntry>,
    #[allow(dead_code)]
    pub raw_response: String,
    pub search_params: SearchQuery,
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct FinderClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl FinderClient {
    /// Create a client for the given server, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create from the `FINDER_SERVER_URL` environment variable, defaulting
    /// to a local development server.
    pub fn from_env() -> Self {
        let base_url = std::env::var("FINDER_SERVER_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        Self::new(base_url)
    }

    /// Run one search.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let response = self
            .http
            .post(format!("{}/api/search", self.base_url))
            .json(query)
            .send()
            .context("Failed to reach the finder server")?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorResponse>()
                .map(|e| e.error)
                .unwrap_or_else(|_| "search failed".to_string());
            bail!("Server returned {}: {}", status, message);
        }

        response
            .json::<SearchResponse>()
            .context("Failed to decode search response")
    }
}
