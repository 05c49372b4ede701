//! `hotel-search.toml` configuration loading.
//!
//! Unknown keys produce a warning with a typo suggestion; unreadable or
//! unparsable files fall back to defaults.

use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::debounce::DEFAULT_DEBOUNCE;
use crate::executor::DEFAULT_SEARCH_SIZE;
use crate::suggest::DEFAULT_SUGGEST_SIZE;

/// File looked up in the working directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "hotel-search.toml";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "HOTEL_SEARCH_API_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:18080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Known keys in `hotel-search.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &[
    "base_url",
    "timeout_secs",
    "auth_token",
    "debounce_ms",
    "suggest_size",
    "search_size",
    "recommendations",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationMode {
    /// Built-in popular regions and hotels.
    Builtin,
    /// `/search/cities` and `/search/hotels` on the search service.
    Remote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Sent verbatim in the `Authorization` header.
    pub auth_token: Option<String>,
    pub debounce: Duration,
    pub suggest_size: usize,
    pub search_size: usize,
    pub recommendations: RecommendationMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            auth_token: None,
            debounce: DEFAULT_DEBOUNCE,
            suggest_size: DEFAULT_SUGGEST_SIZE,
            search_size: DEFAULT_SEARCH_SIZE,
            recommendations: RecommendationMode::Builtin,
        }
    }
}

/// Levenshtein distance over chars, single-row table.
fn edit_distance(a: &str, b: &str) -> usize {
    let target: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=target.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in target.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[target.len()]
}

fn positive(table: &toml::Table, key: &str) -> Option<u64> {
    let value = table.get(key)?;
    match value.as_integer() {
        Some(n) if n > 0 => Some(n as u64),
        _ => {
            warn!(key, value = %value, "Expected a positive integer, keeping default");
            None
        }
    }
}

/// Parse config text, merging recognized keys over defaults.
pub fn parse_search_config(content: &str) -> SearchConfig {
    let mut config = SearchConfig::default();

    let table = match content.parse::<toml::Table>() {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "Failed to parse {CONFIG_FILE_NAME}, using defaults");
            return config;
        }
    };

    // Unknown keys only warn
    for key in table.keys() {
        if KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            continue;
        }
        let suggestion = KNOWN_CONFIG_KEYS
            .iter()
            .min_by_key(|k| edit_distance(key, k))
            .copied()
            .unwrap_or_default();
        if edit_distance(key, suggestion) <= 3 {
            warn!(
                key = key.as_str(),
                suggestion,
                "Unknown key in {CONFIG_FILE_NAME}, did you mean '{suggestion}'?"
            );
        } else {
            warn!(
                key = key.as_str(),
                "Unknown key in {CONFIG_FILE_NAME} (known keys: {})",
                KNOWN_CONFIG_KEYS.join(", ")
            );
        }
    }

    if let Some(url) = table.get("base_url").and_then(|v| v.as_str()) {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = positive(&table, "timeout_secs") {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(token) = table.get("auth_token").and_then(|v| v.as_str()) {
        if !token.is_empty() {
            config.auth_token = Some(token.to_string());
        }
    }
    if let Some(ms) = positive(&table, "debounce_ms") {
        config.debounce = Duration::from_millis(ms);
    }
    if let Some(n) = positive(&table, "suggest_size") {
        config.suggest_size = n as usize;
    }
    if let Some(n) = positive(&table, "search_size") {
        config.search_size = n as usize;
    }
    if let Some(mode) = table.get("recommendations").and_then(|v| v.as_str()) {
        match mode {
            "builtin" => config.recommendations = RecommendationMode::Builtin,
            "remote" => config.recommendations = RecommendationMode::Remote,
            other => warn!(
                value = other,
                "Unknown recommendations source (expected 'builtin' or 'remote')"
            ),
        }
    }

    config
}

/// Load configuration from `path`, or from [`CONFIG_FILE_NAME`] in the
/// working directory. `HOTEL_SEARCH_API_URL` overrides `base_url`.
pub fn load_search_config(path: Option<&Path>) -> SearchConfig {
    let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));

    let mut config = if path.exists() {
        debug!(path = %path.display(), "Loading config");
        match std::fs::read_to_string(path) {
            Ok(content) => parse_search_config(&content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read config file");
                SearchConfig::default()
            }
        }
    } else {
        SearchConfig::default()
    };

    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        if !url.trim().is_empty() {
            debug!(url = url.as_str(), "Base URL overridden from {BASE_URL_ENV}");
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
    }

    config
}
