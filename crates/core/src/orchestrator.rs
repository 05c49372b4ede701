//! Search orchestrator: one explicit instance per search session.
//!
//! The components ([`HotCache`], [`SuggestionFetcher`], [`SearchExecutor`],
//! [`DropdownMachine`]) never touch the network themselves; they hand back a
//! ticketed request. The orchestrator sends it on a spawned task and reports
//! the outcome back under the state lock. The lock is never held across an
//! `.await`.
//!
//! Every state change is published as an immutable [`Snapshot`] on a
//! `tokio::sync::watch` channel.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info};

use crate::backend::{RecommendationSource, SearchBackend};
use crate::config::SearchConfig;
use crate::debounce::{DebounceTicket, Debouncer, DEFAULT_DEBOUNCE};
use crate::dropdown::{DropdownEffect, DropdownMachine, DropdownMode};
use crate::executor::{SearchDispatch, SearchExecutor, DEFAULT_SEARCH_SIZE};
use crate::generation::Ticket;
use crate::hot::{HotCache, HotLookup};
use crate::suggest::{SuggestDispatch, SuggestionFetcher, DEFAULT_SUGGEST_SIZE};
use crate::types::{DomainFilter, Recommendations, SearchResult, SuggestionEntry};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub debounce: Duration,
    pub suggest_size: usize,
    pub search_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            suggest_size: DEFAULT_SUGGEST_SIZE,
            search_size: DEFAULT_SEARCH_SIZE,
        }
    }
}

impl From<&SearchConfig> for OrchestratorConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: config.debounce,
            suggest_size: config.suggest_size,
            search_size: config.search_size,
        }
    }
}

/// What triggered a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitSource {
    Enter,
    SubmitButton,
    /// Row index into the current suggestion list.
    Suggestion(usize),
    /// Row index into the popular regions.
    HotRegion(usize),
    /// Row index into the popular hotels.
    HotHotel(usize),
}

/// Everything the rendering layer may read, frozen at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub query: String,
    pub filter: DomainFilter,
    pub dropdown: DropdownMode,
    pub hot_loading: bool,
    pub suggest_loading: bool,
    pub search_loading: bool,
    pub hot: Option<Arc<Recommendations>>,
    pub suggestions: Arc<Vec<SuggestionEntry>>,
    pub search: Option<Arc<SearchResult>>,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct State {
    query: String,
    filter: DomainFilter,
    dropdown: DropdownMachine,
    hot: HotCache,
    suggest: SuggestionFetcher,
    executor: SearchExecutor,
    debouncer: Debouncer,
    /// Fetch tasks that may still be running.
    tasks: Vec<AbortHandle>,
    disposed: bool,
}

impl State {
    fn new(config: OrchestratorConfig) -> Self {
        Self {
            query: String::new(),
            filter: DomainFilter::All,
            dropdown: DropdownMachine::new(),
            hot: HotCache::new(),
            suggest: SuggestionFetcher::new(config.suggest_size),
            executor: SearchExecutor::new(config.search_size),
            debouncer: Debouncer::new(config.debounce),
            tasks: Vec::new(),
            disposed: false,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            query: self.query.clone(),
            filter: self.filter,
            dropdown: self.dropdown.mode(),
            hot_loading: self.hot.is_loading(),
            suggest_loading: self.suggest.is_loading(),
            search_loading: self.executor.is_loading(),
            hot: self.hot.cached(),
            suggestions: self.suggest.entries(),
            search: self.executor.result(),
        }
    }

    fn track(&mut self, handle: JoinHandle<()>) {
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(handle.abort_handle());
    }

    fn abort_all(&mut self) {
        self.debouncer.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    /// Text a pick commits, or `None` when the index is out of range.
    fn picked_text(&self, source: CommitSource) -> Option<String> {
        match source {
            CommitSource::Enter | CommitSource::SubmitButton => Some(self.query.clone()),
            CommitSource::Suggestion(i) => {
                self.suggest.entries().get(i).map(|e| e.display_text.clone())
            }
            CommitSource::HotRegion(i) => {
                self.hot.cached()?.popular_regions.get(i).map(|r| r.name.clone())
            }
            CommitSource::HotHotel(i) => {
                self.hot.cached()?.popular_hotels.get(i).map(|h| h.name.clone())
            }
        }
    }
}

impl Drop for State {
    fn drop(&mut self) {
        self.abort_all();
    }
}

struct Inner {
    search: Arc<dyn SearchBackend>,
    recommendations: Arc<dyn RecommendationSource>,
    state: Mutex<State>,
    snapshots: watch::Sender<Snapshot>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.snapshots.send_replace(state.snapshot());
    }

    /// Debounce expiry for `query`.
    fn query_settled(self: &Arc<Self>, ticket: DebounceTicket, query: &str) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.disposed || !state.debouncer.fire(ticket) {
            return;
        }
        debug!(query, "Query settled");
        if query.trim().is_empty() {
            state.suggest.clear();
        }
        if let Some(effect) = state.dropdown.on_query_settled(query) {
            self.run_effect(state, effect);
        }
        self.publish(state);
    }

    fn run_effect(self: &Arc<Self>, state: &mut State, effect: DropdownEffect) {
        match effect {
            DropdownEffect::LoadHot => {
                if let HotLookup::Dispatch(ticket) = state.hot.ensure_loaded() {
                    self.spawn_hot(state, ticket);
                }
            }
            DropdownEffect::EnsureSuggestions => {
                if let Some(dispatch) = state.suggest.ensure(&state.query, state.filter) {
                    self.spawn_suggest(state, dispatch);
                }
            }
            DropdownEffect::RequestSuggestions => {
                if let Some(dispatch) = state.suggest.request(&state.query, state.filter) {
                    self.spawn_suggest(state, dispatch);
                }
            }
        }
    }

    fn spawn_hot(self: &Arc<Self>, state: &mut State, ticket: Ticket) {
        let weak = Arc::downgrade(self);
        let source = Arc::clone(&self.recommendations);
        let handle = tokio::spawn(async move {
            let result = source.recommendations().await;
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.lock();
                if state.disposed {
                    return;
                }
                state.hot.complete(ticket, result);
                inner.publish(&state);
            }
        });
        state.track(handle);
    }

    fn spawn_suggest(self: &Arc<Self>, state: &mut State, dispatch: SuggestDispatch) {
        let weak = Arc::downgrade(self);
        let backend = Arc::clone(&self.search);
        let handle = tokio::spawn(async move {
            let result = backend.search(&dispatch.request).await;
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.lock();
                if !state.disposed && state.suggest.complete(dispatch.ticket, result) {
                    inner.publish(&state);
                }
            }
        });
        state.track(handle);
    }

    fn spawn_search(self: &Arc<Self>, state: &mut State, dispatch: SearchDispatch) {
        let weak = Arc::downgrade(self);
        let backend = Arc::clone(&self.search);
        let handle = tokio::spawn(async move {
            let result = backend.search(&dispatch.request).await;
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.lock();
                if !state.disposed && state.executor.complete(&dispatch, result) {
                    inner.publish(&state);
                }
            }
        });
        state.track(handle);
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Handle to a search session. Clones share the same session.
///
/// All methods spawn onto the ambient tokio runtime and must be called from
/// within one.
#[derive(Clone)]
pub struct SearchOrchestrator {
    inner: Arc<Inner>,
}

impl SearchOrchestrator {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        recommendations: Arc<dyn RecommendationSource>,
        config: OrchestratorConfig,
    ) -> Self {
        let state = State::new(config);
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            inner: Arc::new(Inner {
                search,
                recommendations,
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    /// Every keystroke. Restarts the debounce window.
    pub fn on_query_change(&self, query: &str) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.disposed {
            return;
        }
        state.query = query.to_string();

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let settled = query.to_string();
        state.debouncer.schedule(move |ticket| async move {
            if let Some(inner) = weak.upgrade() {
                inner.query_settled(ticket, &settled);
            }
        });
        self.inner.publish(state);
    }

    pub fn on_focus(&self) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.disposed {
            return;
        }
        let effect = state.dropdown.on_focus(&state.query);
        self.inner.run_effect(state, effect);
        self.inner.publish(state);
    }

    /// Escape or pointer-down outside the input and overlay.
    pub fn on_dismiss(&self) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.disposed {
            return;
        }
        state.dropdown.on_dismiss();
        self.inner.publish(state);
    }

    /// Close the dropdown and run a full search. Picks first replace the
    /// query with the picked text. Returns `false` when nothing was
    /// committed: a blank query or an out-of-range pick.
    pub fn on_commit(&self, source: CommitSource) -> bool {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.disposed {
            return false;
        }
        let Some(text) = state.picked_text(source) else {
            debug!(?source, "Pick index out of range, ignoring");
            return false;
        };
        if text.trim().is_empty() {
            return false;
        }

        state.query = text;
        state.debouncer.cancel();
        state.dropdown.on_commit(&state.query);
        if let Some(dispatch) = state.executor.commit(&state.query, state.filter) {
            self.inner.spawn_search(state, dispatch);
        }
        self.inner.publish(state);
        true
    }

    /// Switch the domain filter. Re-runs the latest search when results are
    /// showing and refreshes suggestions when that view is open.
    pub fn on_filter_change(&self, filter: DomainFilter) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.disposed || state.filter == filter {
            return;
        }
        info!(from = %state.filter, to = %filter, "Domain filter changed");
        state.filter = filter;

        if let Some(dispatch) = state.executor.on_filter_change(&state.query, filter) {
            self.inner.spawn_search(state, dispatch);
        }
        if state.dropdown.mode() == DropdownMode::Suggest {
            self.inner.run_effect(state, DropdownEffect::RequestSuggestions);
        }
        self.inner.publish(state);
    }

    /// Empty the query, suggestions and results. The filter is kept.
    pub fn on_clear(&self) {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        if state.disposed {
            return;
        }
        state.query.clear();
        state.debouncer.cancel();
        state.suggest.clear();
        state.executor.clear();
        if let Some(effect) = state.dropdown.on_clear() {
            self.inner.run_effect(state, effect);
        }
        self.inner.publish(state);
    }

    /// Load hot recommendations once per session and return them. Waits for
    /// a load already in flight. `None` when the load failed.
    pub async fn ensure_hot_loaded(&self) -> Option<Arc<Recommendations>> {
        let mut rx = self.inner.snapshots.subscribe();
        {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            if state.disposed {
                return None;
            }
            match state.hot.ensure_loaded() {
                HotLookup::Cached(recs) => return Some(recs),
                HotLookup::InFlight => {}
                HotLookup::Dispatch(ticket) => {
                    self.inner.spawn_hot(state, ticket);
                    self.inner.publish(state);
                }
            }
        }

        loop {
            if self.inner.lock().disposed {
                return None;
            }
            {
                let snap = rx.borrow_and_update();
                if !snap.hot_loading {
                    return snap.hot.clone();
                }
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Cancel the debounce timer and every in-flight fetch. Later events and
    /// late responses are ignored.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.abort_all();
        state.hot.abandon();
        // Wakes ensure_hot_loaded waiters
        self.inner.publish(&state);
        debug!("Search session shut down");
    }
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator").field("snapshot", &self.snapshot()).finish()
    }
}
