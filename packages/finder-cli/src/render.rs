//! Terminal rendering of a result list.

use colored::Colorize;
use finder_core::results::{classify, Channel, CostTier};
use finder_core::ResultEntry;

/// Number of entries shown per "page" of output.
pub const PAGE_SIZE: usize = 10;

/// Print one page of entries starting at `offset`; returns how many were shown.
pub fn render_page(entries: &[ResultEntry], offset: usize) -> usize {
    let page = entries.iter().skip(offset).take(PAGE_SIZE);
    let mut shown = 0;

    for (index, entry) in page.enumerate() {
        render_entry(offset + index + 1, entry);
        shown += 1;
    }

    if shown == 0 {
        println!("{}", "No results to show.".dimmed());
    } else {
        println!(
            "{}",
            format!(
                "Showing {}-{} of {}",
                offset + 1,
                offset + shown,
                entries.len()
            )
            .dimmed()
        );
    }
    shown
}

fn render_entry(number: usize, entry: &ResultEntry) {
    println!();
    print!("{} {}", format!("{}.", number).bright_cyan(), entry.title.bold());
    if let Some(badge) = relevance_badge(entry) {
        print!("  {}", badge);
    }
    println!();

    if !entry.date.is_empty() {
        println!("   {} {}", "Date:".bright_yellow(), entry.date);
    }
    if let Some(time) = &entry.time {
        println!("   {} {}", "Time:".bright_yellow(), time);
    }
    if let Some(location) = &entry.location {
        println!("   {} {}", "Location:".bright_yellow(), location);
    }
    if let Some(distance) = &entry.distance {
        println!("   {} {}", "Distance:".bright_yellow(), distance);
    }
    if !entry.description.is_empty() {
        println!("   {}", entry.description);
    }
    if let Some(organizer) = &entry.organizer {
        println!("   {} {}", "Organizer:".bright_yellow(), organizer);
    }
    if let Some(url) = &entry.registration_url {
        println!("   {} {}", "Link:".bright_yellow(), url.underline());
    }
    if !entry.tags.is_empty() {
        println!("   {} {}", "Tags:".bright_yellow(), entry.tags.join(", ").dimmed());
    }

    // Fuzzy access hint; Unknown tiers stay silent rather than guessing
    let access = classify(entry);
    let mut hints = Vec::new();
    match access.cost {
        CostTier::Free => hints.push("free".bright_green().to_string()),
        CostTier::Paid => hints.push("paid".bright_red().to_string()),
        CostTier::Unknown => {}
    }
    match access.channel {
        Channel::Online => hints.push("online/mail".bright_blue().to_string()),
        Channel::InPerson => hints.push("in person".bright_blue().to_string()),
        Channel::Unknown => {}
    }
    if !hints.is_empty() {
        println!("   {} {}", "Access:".bright_yellow(), hints.join(" · "));
    }
}

fn relevance_badge(entry: &ResultEntry) -> Option<String> {
    let score = entry.relevance_score.as_deref()?;
    let badge = match score {
        "High" => format!("[{}]", score).bright_green(),
        "Medium" => format!("[{}]", score).bright_yellow(),
        _ => format!("[{}]", score).dimmed(),
    };
    Some(badge.to_string())
}
