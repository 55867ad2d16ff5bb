//! Two-tier response extraction.
//!
//! The upstream AI search API is asked for JSON, but what comes back is an
//! arbitrary text blob: sometimes clean JSON, sometimes JSON buried in
//! prose, sometimes a numbered markdown list. Extraction first tries to
//! pull out the embedded JSON object; if that yields nothing usable it
//! falls back to scanning the text line by line. It never errors — a
//! garbage response extracts to an empty list, not a failure the user sees.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::types::ResultEntry;

/// Entries beyond this many miles are dropped by [`filter_by_distance`].
const MAX_DISTANCE_MILES: f64 = 100.0;

/// Minimum length before a free-text line is taken as a description.
const MIN_DESCRIPTION_CHARS: usize = 20;

lazy_static! {
    // Smallest span from a `{` to a `}` containing the container key is not
    // what we want — the object may hold nested braces, so match greedily
    // from the first `{` to the last `}` around the key.
    static ref PROVIDERS_JSON_REGEX: Regex = Regex::new(r#"(?s)\{.*"providers".*\}"#).unwrap();
    static ref EVENTS_JSON_REGEX: Regex = Regex::new(r#"(?s)\{.*"events".*\}"#).unwrap();

    // Numbered or bulleted list marker at line start
    static ref MARKER_REGEX: Regex = Regex::new(r"^\d+\.|^-|^\*").unwrap();

    // "anything date:" prefix, case-insensitive; greedy so the text after
    // the last marker on the line wins
    static ref DATE_LABEL_REGEX: Regex = Regex::new(r"(?i)^.*date:").unwrap();
    static ref TIME_LABEL_REGEX: Regex = Regex::new(r"(?i)^.*time:").unwrap();
    static ref LOCATION_LABEL_REGEX: Regex = Regex::new(r"(?i)^.*location:").unwrap();
    static ref DESCRIPTION_LABEL_REGEX: Regex = Regex::new(r"(?i)^description:").unwrap();

    // Leading residual bullet after a label is stripped
    static ref LEADING_BULLET_REGEX: Regex = Regex::new(r"^-|^\*").unwrap();

    // First URL-shaped substring on a line
    static ref URL_REGEX: Regex = Regex::new(r"(?i)(https?://\S+|www\.\S+)").unwrap();

    // First numeric value in a free-text distance string
    static ref DISTANCE_VALUE_REGEX: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
}

/// Which container key the caller expects in a structured response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    /// Naloxone provider search: `{"providers": [...]}`
    Providers,
    /// Local business event search: `{"events": [...]}`
    Events,
}

impl ListKey {
    fn as_str(self) -> &'static str {
        match self {
            ListKey::Providers => "providers",
            ListKey::Events => "events",
        }
    }

    fn json_regex(self) -> &'static Regex {
        match self {
            ListKey::Providers => &PROVIDERS_JSON_REGEX,
            ListKey::Events => &EVENTS_JSON_REGEX,
        }
    }
}

/// Extraction outcome, tagged by which tier produced it.
///
/// Callers currently treat the tiers identically, but the confidence tier
/// is preserved so they could diverge later (e.g. flagging scraped results
/// in the UI).
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Entries parsed from an embedded JSON object.
    Structured(Vec<ResultEntry>),
    /// Entries scraped from the text by the line-based fallback.
    Heuristic(Vec<ResultEntry>),
    /// Neither tier produced anything.
    Empty,
}

impl Extraction {
    /// Borrow the extracted entries (empty slice for [`Extraction::Empty`]).
    pub fn entries(&self) -> &[ResultEntry] {
        match self {
            Extraction::Structured(entries) | Extraction::Heuristic(entries) => entries,
            Extraction::Empty => &[],
        }
    }

    /// Consume into the extracted entries.
    pub fn into_entries(self) -> Vec<ResultEntry> {
        match self {
            Extraction::Structured(entries) | Extraction::Heuristic(entries) => entries,
            Extraction::Empty => Vec::new(),
        }
    }
}

/// Extract result entries from an opaque AI response.
///
/// Never fails: a structured-parse failure degrades to the heuristic
/// scanner, and a response with nothing recognizable yields
/// [`Extraction::Empty`].
pub fn extract_entries(content: &str, key: ListKey) -> Extraction {
    if let Some(entries) = extract_structured(content, key) {
        tracing::debug!(count = entries.len(), key = key.as_str(), "extracted entries from JSON");
        return Extraction::Structured(entries);
    }

    tracing::debug!(key = key.as_str(), "no usable JSON structure, using text fallback");
    let entries = extract_from_text(content);
    if entries.is_empty() {
        Extraction::Empty
    } else {
        Extraction::Heuristic(entries)
    }
}

/// Tier 1: find and parse an embedded `{... "<key>" ...}` JSON object.
///
/// Returns `None` when there is no match, the match is not valid JSON, or
/// the key does not hold an array — all treated as "this tier produced
/// nothing usable".
fn extract_structured(content: &str, key: ListKey) -> Option<Vec<ResultEntry>> {
    let matched = key.json_regex().find(content)?;

    let parsed: Value = match serde_json::from_str(matched.as_str()) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "embedded JSON failed to parse");
            return None;
        }
    };

    let items = parsed.get(key.as_str())?.as_array()?;
    Some(items.iter().map(entry_from_value).collect())
}

/// Map one JSON array element to a [`ResultEntry`], tolerating missing or
/// wrong-typed fields.
fn entry_from_value(value: &Value) -> ResultEntry {
    ResultEntry {
        title: string_field(value, "title"),
        date: string_field(value, "date"),
        time: optional_field(value, "time"),
        location: optional_field(value, "location"),
        distance: optional_field(value, "distance"),
        description: string_field(value, "description"),
        relevance_score: optional_field(value, "relevance_score"),
        registration_url: optional_field(value, "registration_url"),
        organizer: optional_field(value, "organizer"),
        tags: value
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Tier 2: heuristic line-based fallback.
///
/// Scans the response line by line, building one entry at a time:
/// a numbered/bulleted line starts a new entry (its title), labeled lines
/// fill in date/time/location, a URL becomes the registration link, and
/// the first sufficiently long free-text line becomes the description.
fn extract_from_text(content: &str) -> Vec<ResultEntry> {
    let mut entries = Vec::new();
    let mut current = ResultEntry::default();

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();

        if MARKER_REGEX.is_match(line) && !line.contains("Date") && !line.contains("Link") {
            if !current.title.is_empty() {
                entries.push(std::mem::take(&mut current));
            }
            current = ResultEntry {
                title: MARKER_REGEX.replace(line, "").trim().replace("**", ""),
                ..Default::default()
            };
        } else if lower.contains("date:") {
            current.date = strip_label(&DATE_LABEL_REGEX, line);
        } else if lower.contains("time:") {
            current.time = Some(strip_label(&TIME_LABEL_REGEX, line));
        } else if lower.contains("location:") {
            current.location = Some(strip_label(&LOCATION_LABEL_REGEX, line));
        } else if lower.contains("http") || line.contains("www.") {
            if let Some(url) = URL_REGEX.find(line) {
                current.registration_url = Some(url.as_str().to_string());
            }
        } else if !current.title.is_empty()
            && current.description.is_empty()
            && line.chars().count() > MIN_DESCRIPTION_CHARS
        {
            current.description = DESCRIPTION_LABEL_REGEX.replace(line, "").trim().to_string();
        }
    }

    if !current.title.is_empty() {
        entries.push(current);
    }

    entries.retain(|entry| {
        !entry.title.is_empty() && (!entry.date.is_empty() || !entry.description.is_empty())
    });
    entries
}

/// Remove a `... label:` prefix plus any residual bullet, and trim.
fn strip_label(label: &Regex, line: &str) -> String {
    let stripped = label.replace(line, "");
    LEADING_BULLET_REGEX.replace(stripped.trim(), "").trim().to_string()
}

/// Drop entries more than 100 miles away.
///
/// Entries with no distance, or a distance string with no parseable number,
/// are kept unconditionally — missing data is not grounds for exclusion.
pub fn filter_by_distance(entries: Vec<ResultEntry>) -> Vec<ResultEntry> {
    let before = entries.len();
    let kept: Vec<ResultEntry> = entries
        .into_iter()
        .filter(|entry| match distance_miles(entry) {
            Some(miles) => miles <= MAX_DISTANCE_MILES,
            None => true,
        })
        .collect();
    if kept.len() < before {
        tracing::debug!(before, after = kept.len(), "distance filter dropped entries");
    }
    kept
}

/// First numeric value in the entry's free-text distance, if any.
fn distance_miles(entry: &ResultEntry) -> Option<f64> {
    let distance = entry.distance.as_deref()?;
    let matched = DISTANCE_VALUE_REGEX.find(distance)?;
    matched.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_json(entries: &str) -> String {
        format!(r#"{{"search_location": "Minneapolis, MN (55414)", "providers": [{}]}}"#, entries)
    }

    #[test]
    fn test_structured_extraction_maps_all_fields() {
        let content = provider_json(
            r#"{
                "title": "CVS Pharmacy",
                "date": "",
                "time": "8am-10pm",
                "location": "100 Main St, Minneapolis, MN",
                "distance": "1.2 miles",
                "description": "Stocks naloxone OTC, no prescription needed",
                "relevance_score": "High",
                "registration_url": "https://cvs.com",
                "organizer": "CVS Health",
                "tags": ["pharmacy", "OTC"]
            }"#,
        );

        let extraction = extract_entries(&content, ListKey::Providers);
        let Extraction::Structured(entries) = extraction else {
            panic!("expected structured extraction");
        };

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "CVS Pharmacy");
        assert_eq!(entry.time.as_deref(), Some("8am-10pm"));
        assert_eq!(entry.distance.as_deref(), Some("1.2 miles"));
        assert_eq!(entry.relevance_score.as_deref(), Some("High"));
        assert_eq!(entry.tags, vec!["pharmacy", "OTC"]);
    }

    #[test]
    fn test_structured_extraction_ignores_surrounding_prose() {
        let content = format!(
            "Here are the results you asked for:\n\n{}\n\nLet me know if you need more.",
            provider_json(r#"{"title": "Walgreens", "description": "OTC naloxone available"}"#)
        );

        let extraction = extract_entries(&content, ListKey::Providers);
        assert_eq!(extraction.entries().len(), 1);
        assert_eq!(extraction.entries()[0].title, "Walgreens");
    }

    #[test]
    fn test_structured_extraction_defaults_missing_fields() {
        let content = provider_json(r#"{"title": "Hennepin County Dispenser Box"}"#);

        let entries = extract_entries(&content, ListKey::Providers).into_entries();
        assert_eq!(entries[0].title, "Hennepin County Dispenser Box");
        assert_eq!(entries[0].date, "");
        assert_eq!(entries[0].description, "");
        assert!(entries[0].time.is_none());
        assert!(entries[0].tags.is_empty());
    }

    #[test]
    fn test_events_key_variant() {
        let content = r#"{"events": [{"title": "Farmers Market", "date": "2025-07-12", "description": "Weekly vendor market"}]}"#;

        let extraction = extract_entries(content, ListKey::Events);
        assert!(matches!(extraction, Extraction::Structured(_)));
        assert_eq!(extraction.entries()[0].date, "2025-07-12");
    }

    #[test]
    fn test_key_present_but_not_array_falls_back() {
        let content = r#"{"providers": "none found"}"#;

        // No usable array and nothing scrapeable either
        assert_eq!(extract_entries(content, ListKey::Providers), Extraction::Empty);
    }

    #[test]
    fn test_truncated_json_falls_back_to_text() {
        let content = "1. Foo\nDate: 2025-01-01\n{\"providers\": [{\"title\": \"Bar\"";

        let extraction = extract_entries(content, ListKey::Providers);
        let Extraction::Heuristic(entries) = extraction else {
            panic!("expected heuristic fallback");
        };
        assert_eq!(entries[0].title, "Foo");
        assert_eq!(entries[0].date, "2025-01-01");
    }

    #[test]
    fn test_fallback_parses_numbered_list() {
        let content =
            "1. Foo\nDate: 2025-01-01\nSome long description text exceeding twenty characters.\n";

        let entries = extract_entries(content, ListKey::Providers).into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Foo");
        assert_eq!(entries[0].date, "2025-01-01");
        assert_eq!(
            entries[0].description,
            "Some long description text exceeding twenty characters."
        );
    }

    #[test]
    fn test_fallback_strips_markers_and_bold() {
        let content = "- **Community Health Clinic**\nLocation: 200 Oak Ave\nFree naloxone kits handed out at the front desk.\n";

        let entries = extract_entries(content, ListKey::Providers).into_entries();
        assert_eq!(entries[0].title, "Community Health Clinic");
        assert_eq!(entries[0].location.as_deref(), Some("200 Oak Ave"));
    }

    #[test]
    fn test_fallback_captures_first_url() {
        let content = "1. Steve's Pharmacy\nDate: 2025-03-03\nVisit https://steves.example.com/naloxone for details\n";

        let entries = extract_entries(content, ListKey::Providers).into_entries();
        assert_eq!(
            entries[0].registration_url.as_deref(),
            Some("https://steves.example.com/naloxone")
        );
    }

    #[test]
    fn test_fallback_short_lines_are_not_descriptions() {
        let content = "1. Foo\nDate: 2025-01-01\ntoo short\n";

        let entries = extract_entries(content, ListKey::Providers).into_entries();
        assert_eq!(entries[0].description, "");
    }

    #[test]
    fn test_fallback_discards_untitled_and_empty_entries() {
        // Second block has a title but neither date nor description
        let content = "Date: 2025-01-01\nOrphan metadata line\n1. Bare Title\n";

        let entries = extract_entries(content, ListKey::Providers).into_entries();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_never_errors_on_garbage() {
        for content in ["", "   \n\n  ", "plain prose with no structure at all", "{\"x\": }"] {
            // Must not panic; result may be empty
            let _ = extract_entries(content, ListKey::Providers);
        }
    }

    #[test]
    fn test_distance_filter() {
        let entries = vec![
            ResultEntry {
                title: "Near".into(),
                distance: Some("42 miles".into()),
                ..Default::default()
            },
            ResultEntry {
                title: "Far".into(),
                distance: Some("150 miles".into()),
                ..Default::default()
            },
            ResultEntry {
                title: "Vague".into(),
                distance: Some("far".into()),
                ..Default::default()
            },
            ResultEntry {
                title: "Unknown".into(),
                ..Default::default()
            },
        ];

        let kept = filter_by_distance(entries);
        let titles: Vec<_> = kept.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Near", "Vague", "Unknown"]);
    }

    #[test]
    fn test_distance_filter_parses_decimals() {
        let entries = vec![ResultEntry {
            title: "Decimal".into(),
            distance: Some("99.9 miles from downtown".into()),
            ..Default::default()
        }];

        assert_eq!(filter_by_distance(entries).len(), 1);
    }
}
