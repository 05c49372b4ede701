//! Test harness for orchestrator integration tests.
//!
//! `ScriptedBackend` records every search call. In auto mode it answers at
//! once; in manual mode each call parks until the test releases it, which lets
//! tests resolve responses in any order.

#![allow(dead_code)]

use async_trait::async_trait;
use hotel_search_core::backend::{BuiltinRecommendations, RecommendationSource, SearchBackend};
use hotel_search_core::error::{Result, SearchError};
use hotel_search_core::types::{HotelRecord, Recommendations, SearchPage, SearchRequest};
use hotel_search_core::{OrchestratorConfig, SearchOrchestrator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// A page of `n` hits named `"<query> hotel <i>"`, i starting at 1.
pub fn page_for(query: &str, n: usize) -> SearchPage {
    SearchPage {
        keyword: Some(query.to_string()),
        total: Some(n as u64 * 10),
        hotels: (1..=n)
            .map(|i| HotelRecord {
                hotel_id: Some(i as i64),
                name_en: Some(format!("{query} hotel {i}")),
                ..Default::default()
            })
            .collect(),
        duration_ms: Some(3),
    }
}

/// Let spawned tasks run without crossing a debounce window.
pub async fn drain() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Wait out the debounce window plus slack.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(250)).await;
}

// ---------------------------------------------------------------------------
// Scripted search backend
// ---------------------------------------------------------------------------

enum Mode {
    Auto { hits: usize },
    Manual,
}

pub struct ScriptedBackend {
    mode: Mode,
    calls: Mutex<Vec<SearchRequest>>,
    parked: Mutex<Vec<Option<oneshot::Sender<Result<SearchPage>>>>>,
}

impl ScriptedBackend {
    /// Answers every call immediately with `hits` results.
    pub fn auto(hits: usize) -> Arc<Self> {
        Arc::new(Self {
            mode: Mode::Auto { hits },
            calls: Mutex::new(Vec::new()),
            parked: Mutex::new(Vec::new()),
        })
    }

    /// Parks every call until [`release`](Self::release).
    pub fn manual() -> Arc<Self> {
        Arc::new(Self {
            mode: Mode::Manual,
            calls: Mutex::new(Vec::new()),
            parked: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<SearchRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Resolve the `index`-th call (0-based, in call order).
    pub fn release(&self, index: usize, result: Result<SearchPage>) {
        let sender = self.parked.lock().unwrap()[index]
            .take()
            .unwrap_or_else(|| panic!("call {index} already released"));
        // The caller may have been aborted; that is fine.
        let _ = sender.send(result);
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.calls.lock().unwrap().push(request.clone());
        match self.mode {
            Mode::Auto { hits } => Ok(page_for(&request.query, hits)),
            Mode::Manual => {
                let (tx, rx) = oneshot::channel();
                self.parked.lock().unwrap().push(Some(tx));
                rx.await.unwrap_or_else(|_| Err(SearchError::Transport("dropped".into())))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Counting recommendations source
// ---------------------------------------------------------------------------

pub struct CountingRecommendations {
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingRecommendations {
    pub fn new() -> Arc<Self> {
        Self::failing_first(0)
    }

    /// Fails the first `n` loads with a transport error.
    pub fn failing_first(n: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(n),
            delay: None,
        })
    }

    /// Answers every load after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecommendationSource for CountingRecommendations {
    async fn recommendations(&self) -> Result<Recommendations> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SearchError::Transport("connection refused".into()));
        }
        Ok(BuiltinRecommendations::payload())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct TestHarness {
    pub orchestrator: SearchOrchestrator,
    pub backend: Arc<ScriptedBackend>,
    pub recommendations: Arc<CountingRecommendations>,
}

impl TestHarness {
    pub fn new(backend: Arc<ScriptedBackend>) -> Self {
        Self::with_recommendations(backend, CountingRecommendations::new())
    }

    pub fn with_recommendations(
        backend: Arc<ScriptedBackend>,
        recommendations: Arc<CountingRecommendations>,
    ) -> Self {
        let orchestrator = SearchOrchestrator::new(
            backend.clone(),
            recommendations.clone(),
            OrchestratorConfig::default(),
        );
        Self {
            orchestrator,
            backend,
            recommendations,
        }
    }

    /// Feed `text` one character at a time, `gap` apart.
    pub async fn type_text(&self, text: &str, gap: Duration) {
        let mut typed = String::new();
        for ch in text.chars() {
            typed.push(ch);
            self.orchestrator.on_query_change(&typed);
            tokio::time::sleep(gap).await;
        }
    }
}
