//! Plain-text rendering of search results, suggestions, and snapshots.

use hotel_search_core::dropdown::DropdownMode;
use hotel_search_core::types::{
    strip_highlight, HotelRecord, Recommendations, SearchResult, SuggestionEntry,
};
use hotel_search_core::Snapshot;
use regex::Regex;
use std::sync::OnceLock;

/// How `<em>` highlight markup is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Bold via ANSI escapes, for terminals.
    Ansi,
    /// Tags removed.
    Plain,
}

impl Highlight {
    pub fn detect() -> Self {
        use std::io::IsTerminal;
        if std::io::stdout().is_terminal() {
            Highlight::Ansi
        } else {
            Highlight::Plain
        }
    }

    pub fn apply(self, markup: &str) -> String {
        match self {
            Highlight::Plain => strip_highlight(markup),
            Highlight::Ansi => {
                static EM: OnceLock<Regex> = OnceLock::new();
                let em = EM.get_or_init(|| Regex::new(r"(?s)<em>(.*?)</em>").expect("static regex"));
                strip_highlight(&em.replace_all(markup, "\x1b[1m$1\x1b[0m"))
            }
        }
    }
}

fn hotel_line(index: usize, hotel: &HotelRecord, hl: Highlight) -> String {
    let plain = hotel.display_name();
    let name = hotel
        .highlighted_name()
        .map(|m| hl.apply(m))
        .unwrap_or_else(|| plain.clone());
    let mut line = format!("{:>3}. {name}", index + 1);
    // Compared undecorated, since ANSI bold never equals the raw name
    if let Some(en) = hotel.name_en.as_deref().filter(|en| *en != plain) {
        line.push_str(&format!(" ({en})"));
    }
    if let Some(location) = hotel.location_line() {
        line.push_str(&format!("  {location}"));
    }
    if let Some(brand) = hotel.brand() {
        line.push_str(&format!("  [{brand}]"));
    }
    line
}

pub fn search_lines(result: &SearchResult, hl: Highlight) -> Vec<String> {
    let mut lines = vec![format!(
        "{} of {} results for '{}' [{}]",
        result.items.len(),
        result.total_count,
        result.issued_query,
        result.issued_filter
    )];
    for (i, hotel) in result.items.iter().enumerate() {
        lines.push(hotel_line(i, hotel, hl));
        if let Some(address) = hotel.address() {
            lines.push(format!("       {}", hl.apply(address)));
        }
    }
    lines
}

pub fn suggestion_lines(entries: &[SuggestionEntry], hl: Highlight) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let text = entry
                .highlight_markup
                .as_deref()
                .map(|m| hl.apply(m))
                .unwrap_or_else(|| entry.display_text.clone());
            match &entry.display_text_secondary {
                Some(secondary) => format!("{:>3}. {text}  {secondary}", i + 1),
                None => format!("{:>3}. {text}", i + 1),
            }
        })
        .collect()
}

pub fn hot_lines(recs: &Recommendations) -> Vec<String> {
    let mut lines = vec!["Popular regions".to_string()];
    for (i, region) in recs.popular_regions.iter().enumerate() {
        let mut line = format!("{:>3}. {}", i + 1, region.name);
        if let Some(en) = &region.name_en {
            line.push_str(&format!(" ({en})"));
        }
        if let Some(count) = region.count {
            line.push_str(&format!("  {count} hotels"));
        }
        lines.push(line);
    }
    lines.push("Popular hotels".to_string());
    for (i, hotel) in recs.popular_hotels.iter().enumerate() {
        let mut line = format!("{:>3}. {}", i + 1, hotel.name);
        if let Some(en) = &hotel.name_en {
            line.push_str(&format!(" ({en})"));
        }
        line.push_str(&format!("  {}", hotel.city));
        if let Some(brand) = &hotel.brand {
            line.push_str(&format!("  [{brand}]"));
        }
        lines.push(line);
    }
    lines
}

/// Full view of a snapshot: input line, dropdown panel, then results.
pub fn snapshot_lines(snap: &Snapshot, hl: Highlight) -> Vec<String> {
    let mut flags = Vec::new();
    if snap.hot_loading {
        flags.push("hot");
    }
    if snap.suggest_loading {
        flags.push("suggest");
    }
    if snap.search_loading {
        flags.push("search");
    }
    let loading = if flags.is_empty() {
        String::new()
    } else {
        format!("  loading: {}", flags.join(", "))
    };

    let mut lines = vec![format!(
        "> {}  [{}] dropdown={}{loading}",
        snap.query,
        snap.filter.label(),
        mode_name(snap.dropdown)
    )];

    match snap.dropdown {
        DropdownMode::Closed => {}
        DropdownMode::Hot => match &snap.hot {
            Some(recs) => lines.extend(hot_lines(recs).into_iter().map(|l| format!("  {l}"))),
            None if snap.hot_loading => lines.push("  (loading recommendations)".to_string()),
            None => lines.push("  (no recommendations)".to_string()),
        },
        DropdownMode::Suggest => {
            if snap.suggestions.is_empty() {
                if !snap.suggest_loading {
                    lines.push("  (no suggestions)".to_string());
                }
            } else {
                lines.extend(
                    suggestion_lines(&snap.suggestions, hl).into_iter().map(|l| format!("  {l}")),
                );
            }
        }
    }

    if let Some(result) = &snap.search {
        lines.push(String::new());
        lines.extend(search_lines(result, hl));
    }
    lines
}

fn mode_name(mode: DropdownMode) -> &'static str {
    match mode {
        DropdownMode::Closed => "closed",
        DropdownMode::Hot => "hot",
        DropdownMode::Suggest => "suggest",
    }
}
