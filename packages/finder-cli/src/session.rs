//! Session-scoped search state.
//!
//! The last search's results and parameters, passed between the search
//! prompt and the results view. Overwritten wholesale on every new search;
//! "load more" appends instead. Nothing is persisted anywhere else.

use chrono::NaiveDate;
use finder_core::results::latest_date;
use finder_core::{ResultEntry, SearchQuery};

#[derive(Debug, Default)]
pub struct SearchSession {
    pub results: Vec<ResultEntry>,
    pub params: SearchQuery,
}

impl SearchSession {
    /// Replace the session with a fresh search's outcome.
    pub fn replace(&mut self, results: Vec<ResultEntry>, params: SearchQuery) {
        self.results = results;
        self.params = params;
    }

    /// Append a load-more page to the current results.
    pub fn append(&mut self, mut results: Vec<ResultEntry>) {
        self.results.append(&mut results);
    }

    /// The `afterDate` cursor for the next load-more request: the latest
    /// date seen so far. `None` when no entry carries a parseable date
    /// (provider searches) - there is nothing to page past then.
    pub fn load_more_cursor(&self) -> Option<NaiveDate> {
        latest_date(&self.results)
    }

    /// The query to send for a load-more request.
    pub fn load_more_query(&self) -> Option<SearchQuery> {
        let cursor = self.load_more_cursor()?;
        let mut query = self.params.clone();
        query.after_date = Some(cursor.format("%Y-%m-%d").to_string());
        Some(query)
    }
}
