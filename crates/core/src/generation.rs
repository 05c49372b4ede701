//! Request generations and the per-channel record they guard.
//!
//! Every fetch captures a [`Ticket`] at dispatch. A response may touch its
//! channel (result set or loading flag) only while that ticket is still the
//! channel's current generation; anything older is dropped on arrival.

use serde::Serialize;
use std::fmt;

/// Logical request stream. Each one evolves independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Hot,
    Suggest,
    Search,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Hot => "hot",
            Channel::Suggest => "suggest",
            Channel::Search => "search",
        })
    }
}

/// Claim of one dispatched request on its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub channel: Channel,
    pub generation: u64,
}

/// Monotonic counter for a single channel.
#[derive(Debug)]
pub struct GenerationTracker {
    channel: Channel,
    current: u64,
}

impl GenerationTracker {
    pub fn new(channel: Channel) -> Self {
        Self { channel, current: 0 }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    /// Advance the counter and hand out the ticket for the new request.
    pub fn begin_request(&mut self) -> Ticket {
        self.current += 1;
        Ticket {
            channel: self.channel,
            generation: self.current,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.channel == self.channel && ticket.generation == self.current
    }

    /// Retire every outstanding ticket without starting a request.
    pub fn invalidate(&mut self) {
        self.current += 1;
    }
}

/// Generation counter, loading flag, and last-known-good value of one channel.
///
/// Owned by exactly one component; nothing else mutates it.
#[derive(Debug)]
pub struct ChannelState<T> {
    tracker: GenerationTracker,
    loading: bool,
    value: T,
}

impl<T> ChannelState<T> {
    pub fn new(channel: Channel, initial: T) -> Self {
        Self {
            tracker: GenerationTracker::new(channel),
            loading: false,
            value: initial,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.tracker.current()
    }

    /// Start a request: new generation, loading set.
    pub fn begin_request(&mut self) -> Ticket {
        self.loading = true;
        self.tracker.begin_request()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.tracker.is_current(ticket)
    }

    /// Apply a response value and clear loading. Returns `false` (and changes
    /// nothing) when the ticket has been superseded.
    pub fn apply(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.tracker.is_current(ticket) {
            return false;
        }
        self.value = value;
        self.loading = false;
        true
    }

    /// Clear loading without touching the value. Stale tickets are ignored.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if !self.tracker.is_current(ticket) {
            return false;
        }
        self.loading = false;
        true
    }

    /// Make every in-flight response unobservable and clear loading.
    pub fn supersede(&mut self) {
        self.tracker.invalidate();
        self.loading = false;
    }

    /// Synchronous replacement, outside any request.
    pub fn replace(&mut self, value: T) {
        self.value = value;
    }
}
