//! Domain errors for the hostwatch coordination core.

use thiserror::Error;

/// Errors surfaced by the coordination layer.
///
/// Budget exhaustion is deliberately absent: giving up on polling is a
/// defined terminal outcome ([`crate::domain::models::TransitionOutcome::GaveUp`]),
/// not an error.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// An operation was attempted without its required selection set.
    /// Fatal to the calling operation; shared state is left untouched.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The remote fetch or mutate call itself failed. Terminates any
    /// active poller immediately and is never silently retried.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A transition is already pending for the same (host, server) pair.
    #[error("transition already pending for server '{server}' on host '{host}'")]
    ConflictingTransition { host: String, server: String },

    /// The host controller refused the start/stop command.
    #[error("transition rejected for server '{server}' on host '{host}'")]
    TransitionRejected { host: String, server: String },
}

/// Result alias for coordination-layer operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    /// Whether this error originated at the remote boundary.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
