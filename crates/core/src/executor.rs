//! Search executor: the full search behind commit events.
//!
//! A commit always supersedes the previous one. Errors are shown as "no
//! results", never as a distinct state.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::generation::{Channel, ChannelState, Ticket};
use crate::types::{DomainFilter, SearchPage, SearchRequest, SearchResult};

/// Page size for committed searches.
pub const DEFAULT_SEARCH_SIZE: usize = 20;

/// A search request the caller must send, tagged with its ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDispatch {
    pub ticket: Ticket,
    pub request: SearchRequest,
}

#[derive(Debug)]
pub struct SearchExecutor {
    channel: ChannelState<Option<Arc<SearchResult>>>,
    page_size: usize,
}

impl SearchExecutor {
    pub fn new(page_size: usize) -> Self {
        Self {
            channel: ChannelState::new(Channel::Search, None),
            page_size,
        }
    }

    /// Start a search for `query`. A blank query is ignored outright.
    pub fn commit(&mut self, query: &str, filter: DomainFilter) -> Option<SearchDispatch> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        let ticket = self.channel.begin_request();
        info!(generation = ticket.generation, query = trimmed, %filter, "Search committed");
        Some(SearchDispatch {
            ticket,
            request: SearchRequest::new(trimmed, filter, self.page_size),
        })
    }

    /// Search the current input `query` under `filter` when results are on
    /// display or a search is still in flight. The in-flight one is
    /// superseded. A blank input sends nothing.
    pub fn on_filter_change(&mut self, query: &str, filter: DomainFilter) -> Option<SearchDispatch> {
        if query.trim().is_empty() {
            return None;
        }
        let has_results = self.channel.value().as_ref().is_some_and(|r| !r.is_empty());
        if !(has_results || self.channel.is_loading()) {
            return None;
        }
        debug!(query = query.trim(), %filter, "Domain changed, re-running search");
        self.commit(query, filter)
    }

    /// Apply the outcome of `dispatch`. Stale tickets change nothing.
    pub fn complete(
        &mut self,
        dispatch: &SearchDispatch,
        result: Result<SearchPage, SearchError>,
    ) -> bool {
        let ticket = dispatch.ticket;
        if !self.channel.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                current = self.channel.generation(),
                "Dropping stale search response"
            );
            return false;
        }
        let result = match result {
            Ok(page) => SearchResult::from_page(page, &dispatch.request),
            Err(e) => {
                warn!(
                    category = e.category(),
                    error = %e,
                    query = dispatch.request.query.as_str(),
                    "Search failed, showing no results"
                );
                SearchResult::empty(&dispatch.request)
            }
        };
        debug!(
            generation = ticket.generation,
            items = result.items.len(),
            total = result.total_count,
            "Search results applied"
        );
        self.channel.apply(ticket, Some(Arc::new(result)))
    }

    /// Forget results and retire any in-flight search.
    pub fn clear(&mut self) {
        self.channel.supersede();
        self.channel.replace(None);
    }

    pub fn result(&self) -> Option<Arc<SearchResult>> {
        self.channel.value().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.channel.is_loading()
    }
}

impl Default for SearchExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_SIZE)
    }
}
