//! Service layer: selection, filtering, eventing, convergence polling,
//! and lifecycle coordination.

pub mod convergence_poller;
pub mod event_bus;
pub mod instance_filter;
pub mod lifecycle;
pub mod reload_tracker;
pub mod selection;
pub mod snapshot_store;

pub use convergence_poller::{ConvergencePoller, PollOutcome, PollerState};
pub use event_bus::{ConsoleEvent, EventBus, EventEnvelope, EventKind, StaleDomain};
pub use instance_filter::{Criterion, EntityFilter, GroupCriterion};
pub use lifecycle::{LifecycleCoordinator, TransitionHandle};
pub use reload_tracker::ReloadTracker;
pub use selection::{HostSelection, Selection};
pub use snapshot_store::SnapshotStore;
