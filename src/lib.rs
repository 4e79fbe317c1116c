//! Hostwatch - Management Console Coordination Core
//!
//! Hostwatch drives long-running remote state transitions (start/stop
//! of managed server instances) to completion with bounded fixed-delay
//! convergence polling, and keeps decoupled observers consistent
//! through a shared selection context and an invalidation event bus.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): instance and transition models, error
//!   taxonomy, and the ports external collaborators implement
//! - **Service Layer** (`services`): selection, filtering, eventing,
//!   convergence polling, and lifecycle coordination
//! - **Infrastructure Layer** (`infrastructure`): configuration loading
//!   and logging setup
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hostwatch::domain::models::PollingConfig;
//! use hostwatch::domain::ports::NullInstanceView;
//! use hostwatch::services::{
//!     EventBus, HostSelection, LifecycleCoordinator, ReloadTracker, SnapshotStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let inventory = Arc::new(MyInventoryClient::connect().await?);
//!     let coordinator = LifecycleCoordinator::new(
//!         inventory,
//!         Arc::new(NullInstanceView),
//!         Arc::new(SnapshotStore::new()),
//!         Arc::new(ReloadTracker::new()),
//!         Arc::new(EventBus::new()),
//!         Arc::new(HostSelection::new()),
//!         PollingConfig::default(),
//!     );
//!
//!     coordinator.select_host("primary");
//!     let handle = coordinator.request_transition("primary", "srv1", true).await?;
//!     let outcome = handle.wait().await?;
//!     println!("converged: {}", outcome.is_converged());
//!     Ok(())
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ConsoleError, ConsoleResult};
pub use domain::models::{
    Config, LogFormat, LoggingConfig, PollingConfig, ServerInstance, TransitionKey,
    TransitionOutcome,
};
pub use domain::ports::{HostInventoryStore, InstanceView, NullInstanceView};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::Logging;
pub use services::{
    ConsoleEvent, ConvergencePoller, EntityFilter, EventBus, EventKind, GroupCriterion,
    HostSelection, LifecycleCoordinator, PollOutcome, ReloadTracker, SnapshotStore, StaleDomain,
    TransitionHandle,
};
