//! Domain library for AI-backed local provider search
//!
//! Holds everything about a search that is not HTTP plumbing: the result
//! data model, prompt construction for the upstream AI search API, the
//! two-tier response extractor that turns an opaque completion into
//! structured entries, and the presentation helpers (sorting, upcoming
//! filter, fuzzy access classification) shared by clients.
//!
//! # Design Philosophy
//!
//! The upstream response format is not contractually guaranteed. The
//! extractor therefore never fails: it degrades from "parse the embedded
//! JSON" to "scrape the text line by line" to "empty list", and the caller
//! always gets something to show.
//!
//! # Modules
//!
//! - [`types`] - `ResultEntry` and `SearchQuery`
//! - [`prompts`] - system/user prompt construction per search variant
//! - [`extract`] - two-tier response extraction and the distance filter
//! - [`results`] - presentation helpers (sort, upcoming filter, classification)

pub mod extract;
pub mod prompts;
pub mod results;
pub mod types;

pub use extract::{extract_entries, filter_by_distance, Extraction, ListKey};
pub use types::{ResultEntry, SearchQuery};
