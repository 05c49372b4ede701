//! Hotel Search: incremental search orchestration for a hotel search box.
//!
//! This crate turns raw input events (keystrokes, focus, dismiss, commit,
//! domain filter changes) into three independent network channels: hot
//! recommendations, autosuggest, and full search. Each channel discards
//! responses that were superseded by a later request.
//!
//! # Modules
//!
//! - [`types`]: Domain filter, search requests, hotel records, result sets
//! - [`error`]: Transport and payload errors from the search service
//! - [`generation`]: Per-channel request generations and stale-drop
//! - [`debounce`]: Last-call-wins debounce timer
//! - [`hot`]: Load-once cache for hot recommendations
//! - [`suggest`]: Autosuggest fetcher
//! - [`dropdown`]: CLOSED / HOT / SUGGEST overlay state machine
//! - [`executor`]: Full search behind commit events
//! - [`orchestrator`]: Session object wiring the components to tokio tasks
//! - [`backend`]: Search and recommendation traits, built-in recommendations
//! - [`http`]: reqwest client for the search service
//! - [`config`]: `hotel-search.toml` loading

pub mod backend;
pub mod config;
pub mod debounce;
pub mod dropdown;
pub mod error;
pub mod executor;
pub mod generation;
pub mod hot;
pub mod http;
pub mod orchestrator;
pub mod suggest;
pub mod types;

pub use backend::{BuiltinRecommendations, RecommendationSource, SearchBackend};
pub use config::{load_search_config, RecommendationMode, SearchConfig};
pub use dropdown::DropdownMode;
pub use error::SearchError;
pub use http::HttpSearchClient;
pub use orchestrator::{CommitSource, OrchestratorConfig, SearchOrchestrator, Snapshot};
pub use types::{DomainFilter, HotelRecord, Recommendations, SearchRequest, SearchResult};
