//! Result presentation helpers.
//!
//! Pure functions shared by result views: chronological/spatial/relevance
//! sorting, the upcoming-only filter, the load-more cursor, and the fuzzy
//! free-vs-paid / online-vs-physical classification. All of it operates on
//! free-text fields from the extractor, so everything here is best-effort.

use std::cmp::Ordering;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::ResultEntry;

lazy_static! {
    static ref NUMBER_REGEX: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
}

/// Date formats the upstream has been seen to emit.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// How to order a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    /// Soonest first; entries without a parseable date last
    Date,
    /// Closest first; entries without a parseable distance last
    Distance,
    /// High, then Medium, then General, then everything else
    Relevance,
}

/// Parse an entry's free-text date. `None` for empty or unrecognized text.
pub fn parse_entry_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

/// First numeric value in the entry's distance text.
pub fn distance_value(entry: &ResultEntry) -> Option<f64> {
    let distance = entry.distance.as_deref()?;
    NUMBER_REGEX.find(distance)?.as_str().parse().ok()
}

/// Rank of a relevance label; lower sorts first.
fn relevance_rank(entry: &ResultEntry) -> u8 {
    match entry.relevance_score.as_deref() {
        Some("High") => 0,
        Some("Medium") => 1,
        Some("General") => 2,
        _ => 3,
    }
}

/// Sort entries in place by the chosen option. Stable, so upstream order
/// breaks ties.
pub fn sort_entries(entries: &mut [ResultEntry], sort_by: SortOption) {
    match sort_by {
        SortOption::Date => {
            entries.sort_by_key(|entry| parse_entry_date(&entry.date).unwrap_or(NaiveDate::MAX));
        }
        SortOption::Distance => {
            entries.sort_by(|a, b| {
                let a = distance_value(a).unwrap_or(f64::MAX);
                let b = distance_value(b).unwrap_or(f64::MAX);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            });
        }
        SortOption::Relevance => {
            entries.sort_by_key(relevance_rank);
        }
    }
}

/// Keep only entries dated `today` or later.
///
/// Entries with an empty date (providers) are always kept. Entries whose
/// non-empty date fails to parse are dropped, matching how the original
/// view treated invalid dates.
pub fn filter_upcoming(entries: Vec<ResultEntry>, today: NaiveDate) -> Vec<ResultEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            if entry.date.trim().is_empty() {
                return true;
            }
            matches!(parse_entry_date(&entry.date), Some(date) if date >= today)
        })
        .collect()
}

/// Latest parseable date across entries — the `afterDate` cursor for the
/// next "load more" request.
pub fn latest_date(entries: &[ResultEntry]) -> Option<NaiveDate> {
    entries
        .iter()
        .filter_map(|entry| parse_entry_date(&entry.date))
        .max()
}

/// Whether an offer costs money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostTier {
    Free,
    Paid,
    Unknown,
}

/// How an offer is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Online,
    InPerson,
    Unknown,
}

/// Fuzzy classification of an entry's access model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub cost: CostTier,
    pub channel: Channel,
}

const FREE_KEYWORDS: [&str; 5] = ["free", "no cost", "no-cost", "at no charge", "donation"];
const PAID_KEYWORDS: [&str; 5] = ["$", "fee", "cost", "price", "copay"];
const ONLINE_KEYWORDS: [&str; 5] = ["mail", "online", "ship", "virtual", "delivery"];
const IN_PERSON_KEYWORDS: [&str; 5] = ["pharmacy", "walk-in", "in person", "clinic", "dispenser"];

/// Classify an entry by keyword matching over its description and tags.
///
/// Known-fuzzy: "no cost" beats "cost" only because free keywords are
/// checked first, and anything with a street address counts as in-person.
/// Edge cases will misclassify; callers must treat this as a hint.
pub fn classify(entry: &ResultEntry) -> Access {
    let mut haystack = entry.description.to_lowercase();
    for tag in &entry.tags {
        haystack.push(' ');
        haystack.push_str(&tag.to_lowercase());
    }

    let cost = if FREE_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        CostTier::Free
    } else if PAID_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        CostTier::Paid
    } else {
        CostTier::Unknown
    };

    let channel = if ONLINE_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        Channel::Online
    } else if IN_PERSON_KEYWORDS.iter().any(|k| haystack.contains(k)) || entry.location.is_some() {
        Channel::InPerson
    } else {
        Channel::Unknown
    };

    Access { cost, channel }
}
