//! Client-side caches of the backend cart and wishlist.
//!
//! Both stores follow the same pattern: an authoritative `fetch` replaces
//! local state wholesale, mutations call the backend and then either refetch
//! or apply an optimistic change. Every fetch and every optimistic change
//! takes a ticket from a [`FetchGuard`]; a fetch response is only applied if
//! nothing newer has been applied in the meantime.

pub mod cart;
pub mod wishlist;

pub use cart::{CartStore, CheckoutUnavailable};
pub use wishlist::WishlistStore;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle of a store's most recent authoritative fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The recorded error message, if the last fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Result of a store mutation, for callers that want more than the notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
}

impl MutationOutcome {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// =============================================================================
// FetchGuard
// =============================================================================

/// Request-sequence bookkeeping that keeps stale responses out.
///
/// Tickets increase monotonically. `applied` is the ticket of the newest
/// state written into the store; a fetch holding an older ticket lost the
/// race and its response is dropped.
#[derive(Debug, Default)]
pub(crate) struct FetchGuard {
    next: u64,
    applied: u64,
    latest_fetch: u64,
}

impl FetchGuard {
    fn issue(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    /// Ticket for a fetch that is about to start.
    pub(crate) fn begin_fetch(&mut self) -> u64 {
        let ticket = self.issue();
        self.latest_fetch = ticket;
        ticket
    }

    /// Whether a fetch response may overwrite the store. Marks it applied.
    pub(crate) fn accept(&mut self, ticket: u64) -> bool {
        if ticket < self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }

    /// Record a local change that supersedes every fetch already in flight.
    pub(crate) fn supersede(&mut self) -> u64 {
        let ticket = self.issue();
        self.applied = ticket;
        ticket
    }

    /// Whether `ticket` belongs to the most recently started fetch.
    pub(crate) const fn is_latest_fetch(&self, ticket: u64) -> bool {
        ticket == self.latest_fetch
    }
}

/// Lock a store mutex, recovering the data if a holder panicked.
///
/// Store state is always left consistent between statements, so a poisoned
/// lock carries nothing worse than a half-finished notification.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_fetch_wins_over_earlier() {
        let mut guard = FetchGuard::default();
        let slow = guard.begin_fetch();
        let fast = guard.begin_fetch();

        assert!(guard.accept(fast));
        assert!(!guard.accept(slow));
        assert!(!guard.is_latest_fetch(slow));
    }

    #[test]
    fn test_optimistic_change_discards_inflight_fetch() {
        let mut guard = FetchGuard::default();
        let inflight = guard.begin_fetch();
        guard.supersede();

        assert!(!guard.accept(inflight));
        assert!(guard.is_latest_fetch(inflight));

        let confirm = guard.begin_fetch();
        assert!(guard.accept(confirm));
    }

    #[test]
    fn test_sequential_fetches_all_apply() {
        let mut guard = FetchGuard::default();
        for _ in 0..3 {
            let ticket = guard.begin_fetch();
            assert!(guard.accept(ticket));
        }
    }

    #[test]
    fn test_load_state_error() {
        assert_eq!(LoadState::Failed("boom".into()).error(), Some("boom"));
        assert_eq!(LoadState::Ready.error(), None);
        assert!(LoadState::Loading.is_loading());
    }
}
