//! Suggestion fetcher: small-page search for the debounced query.
//!
//! Failures degrade to an empty list; nothing is surfaced to the user.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::generation::{Channel, ChannelState, Ticket};
use crate::types::{DomainFilter, SearchPage, SearchRequest, SuggestionEntry};

/// Page size for autosuggest calls.
pub const DEFAULT_SUGGEST_SIZE: usize = 8;

/// A suggestion request the caller must send, tagged with its ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestDispatch {
    pub ticket: Ticket,
    pub request: SearchRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SuggestKey {
    query: String,
    filter: DomainFilter,
}

#[derive(Debug)]
pub struct SuggestionFetcher {
    channel: ChannelState<Arc<Vec<SuggestionEntry>>>,
    page_size: usize,
    /// Key of the request currently in flight.
    pending: Option<SuggestKey>,
    /// Key whose response is on display.
    fresh: Option<SuggestKey>,
}

impl SuggestionFetcher {
    pub fn new(page_size: usize) -> Self {
        Self {
            channel: ChannelState::new(Channel::Suggest, Arc::new(Vec::new())),
            page_size,
            pending: None,
            fresh: None,
        }
    }

    /// Start a new request for `query`. A blank query sends nothing and
    /// empties the current list immediately.
    pub fn request(&mut self, query: &str, filter: DomainFilter) -> Option<SuggestDispatch> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.clear();
            return None;
        }
        let ticket = self.channel.begin_request();
        self.pending = Some(SuggestKey {
            query: trimmed.to_string(),
            filter,
        });
        debug!(generation = ticket.generation, query = trimmed, %filter, "Requesting suggestions");
        Some(SuggestDispatch {
            ticket,
            request: SearchRequest::new(trimmed, filter, self.page_size),
        })
    }

    /// Like [`request`](Self::request), but reuses a request that is in flight
    /// or already answered for the same query and filter.
    pub fn ensure(&mut self, query: &str, filter: DomainFilter) -> Option<SuggestDispatch> {
        if self.is_fresh_for(query, filter) {
            return None;
        }
        self.request(query, filter)
    }

    pub fn is_fresh_for(&self, query: &str, filter: DomainFilter) -> bool {
        let key = SuggestKey {
            query: query.trim().to_string(),
            filter,
        };
        let in_flight = self.channel.is_loading() && self.pending.as_ref() == Some(&key);
        in_flight || self.fresh.as_ref() == Some(&key)
    }

    /// Apply a response. Stale tickets are dropped without touching state.
    pub fn complete(&mut self, ticket: Ticket, result: Result<SearchPage, SearchError>) -> bool {
        if !self.channel.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                current = self.channel.generation(),
                "Dropping stale suggestion response"
            );
            return false;
        }
        match result {
            Ok(page) => {
                let entries: Vec<SuggestionEntry> =
                    page.hotels.into_iter().map(SuggestionEntry::from_hit).collect();
                debug!(generation = ticket.generation, count = entries.len(), "Suggestions applied");
                self.channel.apply(ticket, Arc::new(entries));
                self.fresh = self.pending.take();
            }
            Err(e) => {
                warn!(category = e.category(), error = %e, "Suggestion request failed");
                self.channel.apply(ticket, Arc::new(Vec::new()));
                self.pending = None;
                self.fresh = None;
            }
        }
        true
    }

    /// Empty the list and retire any in-flight request.
    pub fn clear(&mut self) {
        self.channel.supersede();
        self.channel.replace(Arc::new(Vec::new()));
        self.pending = None;
        self.fresh = None;
    }

    pub fn entries(&self) -> Arc<Vec<SuggestionEntry>> {
        Arc::clone(self.channel.value())
    }

    pub fn is_loading(&self) -> bool {
        self.channel.is_loading()
    }
}

impl Default for SuggestionFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_SUGGEST_SIZE)
    }
}
