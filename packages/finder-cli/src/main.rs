//! Interactive terminal client for the Naloxone Finder server.
//!
//! Plays the role the search/results pages play in the browser: a search
//! form, a session-scoped copy of the last search's results and params,
//! and a sorted result list with "load more". All state lives in one
//! [`session::SearchSession`] value that is overwritten wholesale on each
//! new search.

mod client;
mod render;
mod session;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use finder_core::results::{filter_upcoming, sort_entries, SortOption};
use finder_core::SearchQuery;

use client::FinderClient;
use session::SearchSession;

fn main() -> Result<()> {
    let term = Term::stdout();
    print_banner(&term)?;

    let client = FinderClient::from_env();
    let mut session = SearchSession::default();
    let mut sort_by = SortOption::Relevance;
    let mut visible = 0;

    loop {
        if session.results.is_empty() {
            let Some(query) = prompt_query()? else {
                break;
            };
            run_search(&client, &mut session, query)?;
            visible = render_results(&mut session, sort_by);
            continue;
        }

        let mut options = vec!["🔍 New search", "↕️  Change sort order"];
        if visible < session.results.len() {
            options.push("📄 Show more results");
        } else if session.load_more_query().is_some() {
            options.push("📄 Load more from search");
        }
        options.push("🛑 Exit");

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact_on(&term)?;

        match options[selection] {
            "🔍 New search" => {
                let Some(query) = prompt_query()? else {
                    break;
                };
                run_search(&client, &mut session, query)?;
                visible = render_results(&mut session, sort_by);
            }
            "↕️  Change sort order" => {
                sort_by = prompt_sort(&term, sort_by)?;
                visible = render_results(&mut session, sort_by);
            }
            "📄 Show more results" => {
                visible = render_results_page(&session, visible);
            }
            "📄 Load more from search" => {
                load_more(&client, &mut session)?;
                visible = render_results(&mut session, sort_by);
            }
            _ => break,
        }
    }

    println!("{}", "👋 Goodbye!".bright_blue());
    Ok(())
}

fn print_banner(term: &Term) -> Result<()> {
    term.clear_screen()?;
    println!(
        "{}",
        "╔════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}",
        "║          Naloxone Finder CLI           ║".bright_cyan()
    );
    println!(
        "{}",
        "╚════════════════════════════════════════╝".bright_cyan()
    );
    println!();
    Ok(())
}

/// Ask for a ZIP code and optional business descriptor. `None` means the
/// user left the ZIP empty to quit.
fn prompt_query() -> Result<Option<SearchQuery>> {
    println!();
    let zip_code: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("ZIP code (empty to exit)")
        .allow_empty(true)
        .interact_text()?;

    if zip_code.trim().is_empty() {
        return Ok(None);
    }

    let business: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Business description (empty for naloxone providers)")
        .allow_empty(true)
        .interact_text()?;

    Ok(Some(SearchQuery {
        zip_code: zip_code.trim().to_string(),
        business: Some(business.trim().to_string()).filter(|b| !b.is_empty()),
        after_date: None,
    }))
}

fn run_search(client: &FinderClient, session: &mut SearchSession, query: SearchQuery) -> Result<()> {
    println!("{}", "🔍 Searching...".bright_blue().bold());
    println!("{}", "   This can take up to a minute".dimmed());

    match client.search(&query) {
        Ok(response) => {
            session.replace(response.results, response.search_params);
            println!(
                "{}",
                format!("✅ Found {} results", session.results.len()).bright_green()
            );
        }
        Err(e) => {
            println!("{}", format!("❌ {}", e).bright_red());
        }
    }
    Ok(())
}

fn load_more(client: &FinderClient, session: &mut SearchSession) -> Result<()> {
    let Some(query) = session.load_more_query() else {
        return Ok(());
    };

    println!("{}", "🔍 Loading more...".bright_blue().bold());
    match client.search(&query) {
        Ok(response) => {
            let count = response.results.len();
            session.append(response.results);
            println!("{}", format!("✅ {} more results", count).bright_green());
        }
        Err(e) => {
            println!("{}", format!("❌ {}", e).bright_red());
        }
    }
    Ok(())
}

fn prompt_sort(term: &Term, current: SortOption) -> Result<SortOption> {
    let options = ["Relevance", "Date", "Distance"];
    let default = match current {
        SortOption::Relevance => 0,
        SortOption::Date => 1,
        SortOption::Distance => 2,
    };

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Sort by")
        .items(&options)
        .default(default)
        .interact_on(term)?;

    Ok(match selection {
        1 => SortOption::Date,
        2 => SortOption::Distance,
        _ => SortOption::Relevance,
    })
}

/// Drop stale dated entries, sort, and show the first page. Returns how
/// many entries are now visible.
fn render_results(session: &mut SearchSession, sort_by: SortOption) -> usize {
    let today = Local::now().date_naive();
    let entries = std::mem::take(&mut session.results);
    session.results = filter_upcoming(entries, today);
    sort_entries(&mut session.results, sort_by);

    render_results_page(session, 0)
}

fn render_results_page(session: &SearchSession, offset: usize) -> usize {
    offset + render::render_page(&session.results, offset)
}
