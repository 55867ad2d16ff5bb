use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API credential. Optional at startup: a missing key is
    /// surfaced as a per-request error so the rest of the site stays up.
    pub perplexity_api_key: Option<String>,
    pub perplexity_model: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            perplexity_api_key: env::var("PERPLEXITY_API_KEY").ok().filter(|k| !k.is_empty()),
            perplexity_model: env::var("PERPLEXITY_MODEL")
                .unwrap_or_else(|_| "sonar-pro".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none_not_error() {
        // from_env must not fail just because the credential is absent
        std::env::remove_var("PERPLEXITY_API_KEY");
        std::env::remove_var("PERPLEXITY_MODEL");
        std::env::remove_var("PORT");
        let config = Config::from_env().unwrap();
        assert!(config.perplexity_api_key.is_none());
        assert_eq!(config.perplexity_model, "sonar-pro");
        assert_eq!(config.port, 8080);
    }
}
