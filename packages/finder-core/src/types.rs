//! Core search types - what goes over the wire and what the user sees.

use serde::{Deserialize, Serialize};

/// One provider or event shown to the user.
///
/// Entries exist only for the duration of one search response; there is no
/// identifier and no persistence. `title` and `description` are the only
/// fields the heuristic parser treats as required — everything else is
/// best-effort data from the upstream response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Provider or event name
    pub title: String,

    /// Event date; empty for providers with no date concept
    #[serde(default)]
    pub date: String,

    /// Hours of operation or event time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Free-text address or venue description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Free-text distance, e.g. "3.2 miles" — not a structured measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,

    /// Free-text description of the service or event
    #[serde(default)]
    pub description: String,

    /// Open vocabulary: "High", "Medium", "General", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<String>,

    /// External link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,

    /// Hosting organization or pharmacy chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,

    /// Unordered labels ("pharmacy", "free", "OTC", ...)
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The user's search input, echoed back alongside results.
///
/// Also serves as the request body of both search endpoints, so the field
/// names follow the public JSON contract (`zipCode`, `afterDate`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Target ZIP code
    #[serde(default)]
    pub zip_code: String,

    /// Optional business descriptor — switches the search to local events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<String>,

    /// Load-more cursor: only results dated after this day (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_date: Option<String>,
}

impl SearchQuery {
    /// Create a provider search for a ZIP code.
    pub fn for_zip(zip_code: impl Into<String>) -> Self {
        Self {
            zip_code: zip_code.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_deserializes_with_missing_optionals() {
        let entry: ResultEntry =
            serde_json::from_str(r#"{"title":"CVS Pharmacy","description":"OTC naloxone"}"#)
                .unwrap();

        assert_eq!(entry.title, "CVS Pharmacy");
        assert_eq!(entry.date, "");
        assert!(entry.time.is_none());
        assert!(entry.tags.is_empty());
    }

    #[test]
    fn test_entry_serializes_without_absent_optionals() {
        let entry = ResultEntry {
            title: "Walgreens".into(),
            description: "24/7".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("time").is_none());
        assert!(json.get("distance").is_none());
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_query_uses_camel_case_wire_names() {
        let query: SearchQuery = serde_json::from_str(
            r#"{"zipCode":"55414","business":"coffee cart","afterDate":"2025-06-01"}"#,
        )
        .unwrap();

        assert_eq!(query.zip_code, "55414");
        assert_eq!(query.business.as_deref(), Some("coffee cart"));
        assert_eq!(query.after_date.as_deref(), Some("2025-06-01"));

        let json = serde_json::to_value(&query).unwrap();
        assert!(json.get("zipCode").is_some());
        assert!(json.get("afterDate").is_some());
    }

    #[test]
    fn test_query_zip_defaults_to_empty() {
        let query: SearchQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.zip_code, "");
    }
}
