//! View-facing store of per-host instance snapshots.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::models::ServerInstance;

/// Latest known instance snapshot per host.
///
/// Snapshots are replaced wholesale; readers receive their own clone
/// and never observe partial updates. During a transition the owning
/// [`crate::services::LifecycleCoordinator`] is the only writer.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: RwLock<HashMap<String, Vec<ServerInstance>>>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for a host.
    pub fn put(&self, host: impl Into<String>, instances: Vec<ServerInstance>) {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(host.into(), instances);
    }

    /// Latest snapshot for a host, if one has been fetched.
    pub fn get(&self, host: &str) -> Option<Vec<ServerInstance>> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host)
            .cloned()
    }

    /// Drop the snapshot for a host.
    pub fn invalidate(&self, host: &str) {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_replace() {
        let store = SnapshotStore::new();
        assert!(store.get("primary").is_none());

        store.put(
            "primary",
            vec![ServerInstance::new("srv1", "main-group", "primary", false)],
        );
        assert_eq!(store.get("primary").unwrap().len(), 1);

        store.put(
            "primary",
            vec![
                ServerInstance::new("srv1", "main-group", "primary", true),
                ServerInstance::new("srv2", "main-group", "primary", true),
            ],
        );
        let snapshot = store.get("primary").unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].running, "snapshot replaced wholesale");
    }

    #[test]
    fn test_invalidate() {
        let store = SnapshotStore::new();
        store.put("primary", vec![]);
        store.invalidate("primary");
        assert!(store.get("primary").is_none());
    }
}
