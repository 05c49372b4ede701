//! Debounce timer: last call wins.
//!
//! Each call bumps a sequence number and aborts the previous timer, then
//! spawns `sleep(delay)` followed by the settle callback. The callback receives
//! its [`DebounceTicket`] and must confirm it with [`Debouncer::fire`] under the
//! owner's lock before acting, so a timer that slipped past its abort still
//! cannot deliver an outdated value.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Quiescence window used by the search input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    seq: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            seq: 0,
            pending: None,
        }
    }

    /// Restart the timer. `fire` builds the future to run once the window
    /// elapses without another call. Must be called inside a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, fire: F) -> DebounceTicket
    where
        F: FnOnce(DebounceTicket) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let ticket = DebounceTicket(self.seq);
        let delay = self.delay;
        let settled = fire(ticket);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            settled.await;
        }));
        ticket
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_current(&self, ticket: DebounceTicket) -> bool {
        self.pending.is_some() && ticket.0 == self.seq
    }

    /// Claim the expiry for `ticket`. Returns `false` if the timer was
    /// restarted or cancelled in the meantime.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        // The running task is the one holding this handle; dropping it does not abort.
        self.pending = None;
        true
    }

    pub fn cancel(&mut self) {
        self.seq += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
