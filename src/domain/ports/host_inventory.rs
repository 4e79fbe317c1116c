use crate::domain::errors::ConsoleResult;
use crate::domain::models::ServerInstance;
use async_trait::async_trait;

/// Port for the remote host inventory.
///
/// The remote calls are the only operations in the coordination core
/// that may block or suspend. Implementations map their transport
/// failures to [`crate::domain::ConsoleError::Transport`].
#[async_trait]
pub trait HostInventoryStore: Send + Sync {
    /// Fetch the current instance list for a host.
    ///
    /// Every call produces a fresh snapshot; the core never mutates a
    /// returned list.
    async fn fetch_instances(&self, host: &str) -> ConsoleResult<Vec<ServerInstance>>;

    /// Ask the host controller to start (`desired = true`) or stop an
    /// instance. Returns whether the command was accepted; acceptance
    /// does not mean the transition has completed.
    async fn set_running(&self, host: &str, server: &str, desired: bool) -> ConsoleResult<bool>;
}
