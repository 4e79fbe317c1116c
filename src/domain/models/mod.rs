//! Domain models: instance snapshots, configuration, transition outcomes.

pub mod config;
pub mod instance;
pub mod transition;

pub use config::{Config, LogFormat, LoggingConfig, PollingConfig};
pub use instance::ServerInstance;
pub use transition::{TransitionKey, TransitionOutcome};
