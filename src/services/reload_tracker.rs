//! Pending-transition markers.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Records which servers have a transition in flight so dependent
/// views can suppress stale reads of the last-known `running` flag.
///
/// Every marker that is set is eventually cleared by the poller that
/// owns the transition, bounded by budget x delay.
///
/// Markers are keyed by server name alone, not by (host, server):
/// same-named servers on different hosts share one marker, and
/// whichever transition terminates first clears it for both. Callers
/// that need per-pair granularity must consult the coordinator's
/// active-transition set instead.
#[derive(Debug, Default)]
pub struct ReloadTracker {
    pending: Mutex<HashSet<String>>,
}

impl ReloadTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a server as having a transition in flight.
    pub fn mark_pending(&self, server: impl Into<String>) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(server.into());
    }

    /// Clear the marker for a server.
    pub fn clear(&self, server: &str) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(server);
    }

    /// Whether a transition is in flight for the server.
    pub fn is_pending(&self, server: &str) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(server)
    }

    /// Number of servers with a transition in flight.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_clear() {
        let tracker = ReloadTracker::new();
        assert!(!tracker.is_pending("srv1"));

        tracker.mark_pending("srv1");
        assert!(tracker.is_pending("srv1"));
        assert_eq!(tracker.pending_count(), 1);

        tracker.clear("srv1");
        assert!(!tracker.is_pending("srv1"));
        assert_eq!(tracker.pending_count(), 0);
    }

    #[test]
    fn test_marker_is_shared_across_hosts() {
        let tracker = ReloadTracker::new();

        // Both hosts mark the same server name; one marker exists.
        tracker.mark_pending("srv1");
        tracker.mark_pending("srv1");
        assert_eq!(tracker.pending_count(), 1);

        tracker.clear("srv1");
        assert!(!tracker.is_pending("srv1"), "a single clear removes it");
    }

    #[test]
    fn test_clear_unknown_is_noop() {
        let tracker = ReloadTracker::new();
        tracker.clear("never-marked");
        assert_eq!(tracker.pending_count(), 0);
    }
}
