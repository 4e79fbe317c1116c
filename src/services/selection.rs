//! Shared host/server selection context.

use std::sync::RwLock;

/// The currently selected host and, transitively, server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// Selected host, if any.
    pub host: Option<String>,
    /// Selected server within the host, if any.
    pub server: Option<String>,
}

/// Process-wide holder of the current selection.
///
/// Single designated writer path, many readers. A read that races a
/// write observes either the old or the new selection, never a torn
/// one. The selection can change concurrently with an in-flight
/// operation, so components must not cache it beyond a single
/// operation without re-checking [`HostSelection::is_set`].
#[derive(Debug, Default)]
pub struct HostSelection {
    current: RwLock<Selection>,
}

impl HostSelection {
    /// Create an empty selection context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection snapshot.
    pub fn get(&self) -> Selection {
        self.current.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Currently selected host, if any.
    pub fn host(&self) -> Option<String> {
        self.current.read().unwrap_or_else(std::sync::PoisonError::into_inner).host.clone()
    }

    /// Select a host. Clears any server selection, which belonged to
    /// the previous host.
    pub fn set_host(&self, host: impl Into<String>) {
        let mut guard = self.current.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.host = Some(host.into());
        guard.server = None;
    }

    /// Select a server within the currently selected host.
    pub fn set_server(&self, server: impl Into<String>) {
        let mut guard = self.current.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.server = Some(server.into());
    }

    /// Clear the selection entirely.
    pub fn clear(&self) {
        let mut guard = self.current.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Selection::default();
    }

    /// Whether a host is currently selected. Callers must check this
    /// before operations that require a scope.
    pub fn is_set(&self) -> bool {
        self.current.read().unwrap_or_else(std::sync::PoisonError::into_inner).host.is_some()
    }
}
