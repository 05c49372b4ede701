//! Hot-recommendations cache: load once per session, serve from memory after.
//!
//! Only successes are memoized. A failed load clears the loading flag and
//! leaves the cache empty so the next focus can retry.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::generation::{Channel, ChannelState, Ticket};
use crate::types::Recommendations;

/// Outcome of [`HotCache::ensure_loaded`].
#[derive(Debug, Clone, PartialEq)]
pub enum HotLookup {
    /// Already loaded; no network call.
    Cached(Arc<Recommendations>),
    /// A load is already running; wait for it.
    InFlight,
    /// Caller must fetch and report back with this ticket.
    Dispatch(Ticket),
}

#[derive(Debug)]
pub struct HotCache {
    channel: ChannelState<Option<Arc<Recommendations>>>,
}

impl HotCache {
    pub fn new() -> Self {
        Self {
            channel: ChannelState::new(Channel::Hot, None),
        }
    }

    pub fn ensure_loaded(&mut self) -> HotLookup {
        if let Some(cached) = self.channel.value() {
            return HotLookup::Cached(Arc::clone(cached));
        }
        if self.channel.is_loading() {
            return HotLookup::InFlight;
        }
        let ticket = self.channel.begin_request();
        debug!(generation = ticket.generation, "Loading hot recommendations");
        HotLookup::Dispatch(ticket)
    }

    /// Record the outcome of a dispatched load.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Recommendations, SearchError>,
    ) -> bool {
        match result {
            Ok(recs) => {
                let regions = recs.popular_regions.len();
                let hotels = recs.popular_hotels.len();
                let applied = self.channel.apply(ticket, Some(Arc::new(recs)));
                if applied {
                    debug!(regions, hotels, "Hot recommendations cached");
                }
                applied
            }
            Err(e) => {
                if self.channel.settle(ticket) {
                    warn!(category = e.category(), error = %e, "Hot recommendations failed to load");
                }
                false
            }
        }
    }

    pub fn cached(&self) -> Option<Arc<Recommendations>> {
        self.channel.value().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.channel.value().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.channel.is_loading()
    }

    /// Drop an in-flight load, e.g. on teardown.
    pub fn abandon(&mut self) {
        self.channel.supersede();
    }
}

impl Default for HotCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HotRegion;

    fn recs() -> Recommendations {
        Recommendations {
            popular_regions: vec![HotRegion {
                name: "Sanya".into(),
                name_en: None,
                count: Some(4500),
            }],
            popular_hotels: vec![],
        }
    }

    #[test]
    fn loads_once_then_serves_cache() {
        let mut cache = HotCache::new();
        let ticket = match cache.ensure_loaded() {
            HotLookup::Dispatch(t) => t,
            other => panic!("expected dispatch, got {other:?}"),
        };
        assert!(cache.is_loading());
        assert_eq!(cache.ensure_loaded(), HotLookup::InFlight);

        assert!(cache.complete(ticket, Ok(recs())));
        assert!(!cache.is_loading());
        match cache.ensure_loaded() {
            HotLookup::Cached(r) => assert_eq!(r.popular_regions[0].name, "Sanya"),
            other => panic!("expected cached, got {other:?}"),
        }
    }

    #[test]
    fn failure_is_not_cached() {
        let mut cache = HotCache::new();
        let HotLookup::Dispatch(first) = cache.ensure_loaded() else {
            panic!("expected dispatch");
        };
        assert!(!cache.complete(first, Err(SearchError::Transport("offline".into()))));
        assert!(!cache.is_loading());
        assert!(cache.cached().is_none());

        // Retry is allowed on the next call
        let HotLookup::Dispatch(second) = cache.ensure_loaded() else {
            panic!("expected a retry dispatch");
        };
        assert!(cache.complete(second, Ok(recs())));
        assert!(cache.is_loaded());
    }

    #[test]
    fn abandoned_load_is_ignored() {
        let mut cache = HotCache::new();
        let HotLookup::Dispatch(ticket) = cache.ensure_loaded() else {
            panic!("expected dispatch");
        };
        cache.abandon();
        assert!(!cache.complete(ticket, Ok(recs())));
        assert!(cache.cached().is_none());
    }
}
