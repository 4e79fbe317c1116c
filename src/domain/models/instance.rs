//! Server instance snapshot model.

use serde::{Deserialize, Serialize};

/// One managed server instance as observed on a host.
///
/// Instances are snapshot values: every successful fetch or poll tick
/// produces a new list, and existing lists are never mutated field by
/// field. The `running` flag is observed liveness, which may lag the
/// true remote state while a transition is in flight; consumers should
/// check [`crate::services::ReloadTracker`] before trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInstance {
    /// Instance name, unique within its owning host.
    pub name: String,
    /// Logical server group the instance belongs to.
    pub group: String,
    /// Owning host.
    pub host: String,
    /// Observed liveness at snapshot time.
    pub running: bool,
}

impl ServerInstance {
    /// Create a new instance snapshot entry.
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        host: impl Into<String>,
        running: bool,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            host: host.into(),
            running,
        }
    }
}

impl std::fmt::Display for ServerInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} [{}] {}",
            self.host,
            self.name,
            self.group,
            if self.running { "running" } else { "stopped" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let instance = ServerInstance::new("srv1", "main-group", "primary", true);
        assert_eq!(instance.to_string(), "primary/srv1 [main-group] running");
    }

    #[test]
    fn test_serde_round_trip() {
        let instance = ServerInstance::new("srv1", "main-group", "primary", false);
        let json = serde_json::to_string(&instance).unwrap();
        let back: ServerInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(instance, back);
    }
}
