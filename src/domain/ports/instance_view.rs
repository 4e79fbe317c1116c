use crate::domain::models::ServerInstance;

/// Port for the presentation layer.
///
/// Receives fully computed snapshots and never participates in control
/// flow. Invoked once per fetch/poll tick and once at poller
/// termination; implementations must return promptly and must not call
/// back into the coordinator.
pub trait InstanceView: Send + Sync {
    /// A new instance snapshot is available for `host`.
    fn on_instances_updated(&self, host: &str, instances: &[ServerInstance]);
}

/// View that discards all updates, for callers that only consume
/// events and snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInstanceView;

impl InstanceView for NullInstanceView {
    fn on_instances_updated(&self, _host: &str, _instances: &[ServerInstance]) {}
}
