//! Synchronous search endpoint.
//!
//! POST /api/search with `{zipCode, business?, afterDate?}`.
//!
//! One non-streaming completion call against the upstream AI search API,
//! then the two-tier extractor over the returned text. The raw response is
//! echoed alongside the parsed results so the client can fall back to its
//! own handling if it wants to.

use axum::{extract::Extension, http::StatusCode, Json};
use finder_core::{extract_entries, filter_by_distance, prompts, ResultEntry, SearchQuery};
use perplexity_client::{truncate_to_char_boundary, ChatRequest, Message};
use serde::Serialize;
use tracing::{debug, error};

use crate::server::app::AppState;

/// Token budget for the one-shot completion.
const MAX_TOKENS: u32 = 5000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<ResultEntry>,
    pub raw_response: String,
    pub search_params: SearchQuery,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type SearchError = (StatusCode, Json<ErrorResponse>);

fn search_error(status: StatusCode, message: &str) -> SearchError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Synchronous search handler.
pub async fn search_handler(
    Extension(state): Extension<AppState>,
    Json(query): Json<SearchQuery>,
) -> Result<Json<SearchResponse>, SearchError> {
    if query.zip_code.trim().is_empty() {
        return Err(search_error(
            StatusCode::BAD_REQUEST,
            "Zip code is required",
        ));
    }

    let Some(client) = &state.client else {
        error!("PERPLEXITY_API_KEY not found in environment variables");
        return Err(search_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "API configuration error",
        ));
    };

    let request = ChatRequest::new(&state.model)
        .message(Message::system(prompts::system_prompt(&query)))
        .message(Message::user(prompts::user_prompt(&query)))
        .temperature(0.1)
        .max_tokens(MAX_TOKENS);

    let response = client.chat_completion(request).await.map_err(|e| {
        error!(error = %e, "upstream search call failed");
        search_error(StatusCode::BAD_GATEWAY, "Failed to search for providers")
    })?;

    debug!(
        chars = response.content.len(),
        preview = truncate_to_char_boundary(&response.content, 2000),
        "raw search response"
    );

    let extraction = extract_entries(&response.content, prompts::list_key(&query));
    let results = filter_by_distance(extraction.into_entries());

    debug!(count = results.len(), "parsed search results");

    Ok(Json(SearchResponse {
        results,
        raw_response: response.content,
        search_params: query,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured_state() -> AppState {
        AppState {
            client: None,
            model: "sonar-pro".into(),
        }
    }

    #[tokio::test]
    async fn test_empty_zip_is_bad_request() {
        let result = search_handler(
            Extension(unconfigured_state()),
            Json(SearchQuery::for_zip("  ")),
        )
        .await;

        let (status, Json(body)) = result.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Zip code is required");
    }

    #[tokio::test]
    async fn test_missing_credential_is_config_error() {
        let result = search_handler(
            Extension(unconfigured_state()),
            Json(SearchQuery::for_zip("55414")),
        )
        .await;

        let (status, Json(body)) = result.err().unwrap();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "API configuration error");
    }

    #[test]
    fn test_response_wire_shape() {
        let response = SearchResponse {
            results: vec![ResultEntry {
                title: "CVS Pharmacy".into(),
                description: "OTC naloxone".into(),
                ..Default::default()
            }],
            raw_response: "raw text".into(),
            search_params: SearchQuery::for_zip("55414"),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["rawResponse"], "raw text");
        assert_eq!(json["searchParams"]["zipCode"], "55414");
        assert_eq!(json["results"][0]["title"], "CVS Pharmacy");
    }
}
