//! Prompt construction for the upstream AI search API.
//!
//! Two search variants share one shape: a system prompt that pins down the
//! required JSON output (container key + entry fields) and a user prompt
//! restating the query. The provider variant looks for naloxone access
//! points around a ZIP code; the event variant (active when the query
//! carries a business descriptor) looks for local events instead.

use crate::extract::ListKey;
use crate::types::SearchQuery;

/// System prompt for the naloxone provider search.
const PROVIDER_SYSTEM_PROMPT: &str = r#"In ZIP {zip} and nearby areas, list confirmed providers and resources offering free or low-cost naloxone access.

CRITICAL REQUIREMENTS:
- Include the provider name, description, locations (address, hours), contact/website as available
- Specifically list individual pharmacies (chain + independent) in {zip} and surrounding area that stock naloxone over-the-counter (without prescription) and note the pharmacy name and address
- Include other distribution channels such as county dispenser boxes, mail-order programs, community organisations
- Do NOT just say "Pharmacies" generically; list each specific pharmacy individually
- Ensure data reflects local availability around {zip}
- You MUST return results in JSON format

Return 10-20 providers in this EXACT JSON format:
{
  "search_location": "City, State (Zip Code)",
  "providers": [
    {
      "title": "Provider/Pharmacy Name",
      "date": "",
      "time": "Hours of operation",
      "location": "Full Address",
      "distance": "XX miles",
      "description": "Description of service, whether prescription required, cost details",
      "relevance_score": "High",
      "registration_url": "Website URL if available",
      "organizer": "Organization or chain name",
      "tags": ["pharmacy", "free", "OTC", "24/7", etc]
    }
  ]
}

Sort by: 1) Distance (closer first), 2) Free/low-cost options first. Use real, current provider data."#;

/// User prompt for the naloxone provider search.
const PROVIDER_USER_PROMPT: &str = r#"Find naloxone providers and resources in ZIP code {zip}. List specific pharmacies, community distribution points, and other free or low-cost naloxone access points. Return results in JSON format as specified in your system prompt."#;

/// System prompt for the local business event search.
const EVENT_SYSTEM_PROMPT: &str = r#"In ZIP {zip} and nearby areas, list confirmed upcoming events relevant to a local business described as "{business}".

CRITICAL REQUIREMENTS:
- Include the event name, date, time, venue address, and organizer as available
- Focus on events where such a business could reach customers: markets, fairs, festivals, networking nights, community gatherings
- Do NOT invent events; only include events you can confirm
- Ensure data reflects the area around {zip}
- You MUST return results in JSON format

Return 10-20 events in this EXACT JSON format:
{
  "search_location": "City, State (Zip Code)",
  "events": [
    {
      "title": "Event Name",
      "date": "YYYY-MM-DD",
      "time": "Start time",
      "location": "Venue, Full Address",
      "distance": "XX miles",
      "description": "What the event is and who attends",
      "relevance_score": "High",
      "registration_url": "Registration or info URL if available",
      "organizer": "Hosting organization",
      "tags": ["market", "outdoor", "weekly", etc]
    }
  ]
}

Sort by: 1) Date (soonest first), 2) Distance (closer first). Use real, current event data."#;

/// User prompt for the local business event search.
const EVENT_USER_PROMPT: &str = r#"Find upcoming events near ZIP code {zip} where a business described as "{business}" could participate or reach customers. Return results in JSON format as specified in your system prompt."#;

/// Extra constraint appended when paging past already-seen dates.
const AFTER_DATE_CONSTRAINT: &str =
    "\n\nOnly include results dated strictly after {after_date}.";

/// Which container key the upstream is instructed to use for this query.
pub fn list_key(query: &SearchQuery) -> ListKey {
    if query.business.is_some() {
        ListKey::Events
    } else {
        ListKey::Providers
    }
}

/// Build the system prompt for a query.
pub fn system_prompt(query: &SearchQuery) -> String {
    let mut prompt = match &query.business {
        Some(business) => EVENT_SYSTEM_PROMPT
            .replace("{zip}", &query.zip_code)
            .replace("{business}", business),
        None => PROVIDER_SYSTEM_PROMPT.replace("{zip}", &query.zip_code),
    };

    if let Some(after_date) = &query.after_date {
        prompt.push_str(&AFTER_DATE_CONSTRAINT.replace("{after_date}", after_date));
    }
    prompt
}

/// Build the user prompt for a query.
pub fn user_prompt(query: &SearchQuery) -> String {
    match &query.business {
        Some(business) => EVENT_USER_PROMPT
            .replace("{zip}", &query.zip_code)
            .replace("{business}", business),
        None => PROVIDER_USER_PROMPT.replace("{zip}", &query.zip_code),
    }
}
