//! Hotel Search CLI: the search console from a terminal.
//!
//! One-shot `search`, `suggest` and `hot` calls go straight to the service;
//! `demo` runs a full search session driven by stdin.

mod demo;
mod render;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use hotel_search_core::types::{SearchRequest, SearchResult, SuggestionEntry};
use hotel_search_core::{
    load_search_config, BuiltinRecommendations, DomainFilter, HttpSearchClient,
    OrchestratorConfig, RecommendationMode, RecommendationSource, SearchBackend, SearchConfig,
    SearchOrchestrator,
};

use render::Highlight;

/// Hotel Search CLI: query the hotel search service from the terminal.
#[derive(Parser)]
#[command(name = "hs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ./hotel-search.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Search service base URL, overrides config and HOTEL_SEARCH_API_URL
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full search, as on commit
    Search {
        /// Search query
        query: String,

        /// Business domain: all, cn, hmt, intl
        #[arg(long, default_value = "all")]
        domain: DomainFilter,

        /// Page size (default: search_size from config)
        #[arg(long)]
        size: Option<usize>,

        /// Country hint
        #[arg(long)]
        country: Option<String>,

        /// City hint
        #[arg(long)]
        city: Option<String>,

        /// Latitude hint
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude hint
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Autosuggest rows for a partial query
    Suggest {
        /// Partial query
        query: String,

        /// Business domain: all, cn, hmt, intl
        #[arg(long, default_value = "all")]
        domain: DomainFilter,

        /// Number of suggestions (default: suggest_size from config)
        #[arg(long)]
        size: Option<usize>,
    },
    /// Show hot recommendations
    Hot,
    /// Interactive session: lines are keystrokes, `:commands` are gestures
    Demo,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Could not encode output: {e}");
            std::process::exit(1);
        }
    }
}

fn http_client(config: &SearchConfig) -> HttpSearchClient {
    HttpSearchClient::new(config).unwrap_or_else(|e| {
        eprintln!("Could not create HTTP client: {e}");
        std::process::exit(1);
    })
}

fn recommendation_source(
    config: &SearchConfig,
    client: &Arc<HttpSearchClient>,
) -> Arc<dyn RecommendationSource> {
    match config.recommendations {
        RecommendationMode::Builtin => Arc::new(BuiltinRecommendations),
        RecommendationMode::Remote => client.clone(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hotel_search_core=warn".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = load_search_config(cli.config.as_deref());
    if let Some(url) = &cli.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    debug!(base_url = config.base_url.as_str(), "Using search service");

    match cli.command {
        Commands::Search { query, domain, size, country, city, lat, lon } => {
            let client = http_client(&config);
            let mut request = SearchRequest::new(query, domain, size.unwrap_or(config.search_size));
            request.country = country;
            request.city = city;
            request.lat = lat;
            request.lon = lon;

            let page = client.search(&request).await.unwrap_or_else(|e| {
                eprintln!("Search failed: {e}");
                std::process::exit(1);
            });
            let result = SearchResult::from_page(page, &request);

            if cli.json {
                print_json(&result);
            } else {
                if result.is_empty() {
                    eprintln!("No results for '{}'", request.query);
                    std::process::exit(1);
                }
                for line in render::search_lines(&result, Highlight::detect()) {
                    println!("{line}");
                }
            }
        }
        Commands::Suggest { query, domain, size } => {
            if query.trim().is_empty() {
                eprintln!("Query is empty, nothing to suggest");
                std::process::exit(1);
            }
            let client = http_client(&config);
            let request =
                SearchRequest::new(query.trim(), domain, size.unwrap_or(config.suggest_size));
            let page = client.search(&request).await.unwrap_or_else(|e| {
                eprintln!("Suggest failed: {e}");
                std::process::exit(1);
            });
            let entries: Vec<SuggestionEntry> =
                page.hotels.into_iter().map(SuggestionEntry::from_hit).collect();

            if cli.json {
                print_json(&entries);
            } else {
                if entries.is_empty() {
                    eprintln!("No suggestions for '{}'", request.query);
                    std::process::exit(1);
                }
                for line in render::suggestion_lines(&entries, Highlight::detect()) {
                    println!("{line}");
                }
            }
        }
        Commands::Hot => {
            let client = Arc::new(http_client(&config));
            let source = recommendation_source(&config, &client);
            let recs = source.recommendations().await.unwrap_or_else(|e| {
                eprintln!("Could not load recommendations: {e}");
                std::process::exit(1);
            });

            if cli.json {
                print_json(&recs);
            } else {
                for line in render::hot_lines(&recs) {
                    println!("{line}");
                }
            }
        }
        Commands::Demo => {
            let client = Arc::new(http_client(&config));
            let recommendations = recommendation_source(&config, &client);
            let orchestrator = SearchOrchestrator::new(
                client,
                recommendations,
                OrchestratorConfig::from(&config),
            );
            if let Err(e) = demo::run(orchestrator, cli.json).await {
                eprintln!("Demo aborted: {e}");
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "hs", &mut std::io::stdout());
        }
    }
}
