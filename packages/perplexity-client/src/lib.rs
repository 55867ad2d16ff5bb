//! Pure Perplexity REST API client
//!
//! A clean, minimal client for the Perplexity chat completions API with no
//! domain-specific logic. Supports one-shot completions and SSE streaming.
//!
//! # Example
//!
//! ```rust,ignore
//! use perplexity_client::{PerplexityClient, ChatRequest, Message};
//!
//! let client = PerplexityClient::from_env()?;
//!
//! // One-shot completion
//! let response = client.chat_completion(
//!     ChatRequest::new("sonar-pro")
//!         .message(Message::system("You are a local search assistant"))
//!         .message(Message::user("Find pharmacies near 55414"))
//!         .temperature(0.1)
//!         .max_tokens(5000),
//! ).await?;
//!
//! // Streaming completion
//! use futures::StreamExt;
//! let mut stream = client.chat_completion_stream(request).await?;
//! while let Some(event) = stream.next().await {
//!     // StreamEvent::Delta(text) or StreamEvent::Done
//! }
//! ```

pub mod error;
pub mod streaming;
pub mod types;

pub use error::{PerplexityError, Result};
pub use streaming::{ChatCompletionStream, StreamEvent};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Pure Perplexity API client.
#[derive(Clone)]
pub struct PerplexityClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl PerplexityClient {
    /// Create a new Perplexity client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.perplexity.ai".to_string(),
        }
    }

    /// Create from environment variable `PERPLEXITY_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PERPLEXITY_API_KEY")
            .map_err(|_| PerplexityError::Config("PERPLEXITY_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies or compatible endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completions API and get one full response.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Perplexity request failed");
                PerplexityError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Perplexity API error");
            return Err(PerplexityError::Api(format!(
                "Perplexity API error: {}",
                error_text
            )));
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| PerplexityError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PerplexityError::Api("No response from Perplexity".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Perplexity chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }

    /// Streaming chat completion.
    ///
    /// Send messages and get a stream of token deltas back, terminated by
    /// `[DONE]`. Uses SSE (server-sent events) from the Perplexity API.
    pub async fn chat_completion_stream(&self, request: ChatRequest) -> Result<ChatCompletionStream> {
        use reqwest::header;

        // Build JSON body with stream: true
        let mut body = serde_json::to_value(&request)
            .map_err(|e| PerplexityError::Parse(format!("Failed to serialize request: {}", e)))?;
        body["stream"] = serde_json::Value::Bool(true);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Perplexity streaming request failed");
                PerplexityError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Perplexity streaming API error");
            return Err(PerplexityError::Api(format!(
                "Perplexity streaming API error: {}",
                error_text
            )));
        }

        Ok(ChatCompletionStream::new(response.bytes_stream()))
    }
}
