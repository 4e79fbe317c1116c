//! Transition identity and terminal outcomes.

use serde::{Deserialize, Serialize};

use super::instance::ServerInstance;

/// Identity of a transition: at most one poll loop may be in flight
/// per key at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionKey {
    /// Owning host.
    pub host: String,
    /// Instance name within the host.
    pub server: String,
}

impl TransitionKey {
    /// Build a key from host and server names.
    pub fn new(host: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            server: server.into(),
        }
    }
}

impl std::fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.host, self.server)
    }
}

/// Terminal outcome of a transition watch.
///
/// `GaveUp` is a successful-but-unconverged completion, distinct from
/// both true convergence and probe failure: the last observed snapshot
/// is considered authoritative even though the target state was never
/// seen within the budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransitionOutcome {
    /// The entity reached the desired state after `ticks` probes.
    Converged {
        /// Number of probe invocations performed.
        ticks: u32,
        /// Final snapshot observed at convergence.
        instances: Vec<ServerInstance>,
    },
    /// The tick budget ran out before convergence was observed.
    GaveUp {
        /// Number of probe invocations performed (equals the budget).
        ticks: u32,
        /// Last snapshot observed before giving up.
        instances: Vec<ServerInstance>,
    },
    /// The watch was cancelled externally before it terminated.
    Cancelled {
        /// Number of probe invocations completed before cancellation
        /// took effect.
        ticks: u32,
    },
}

impl TransitionOutcome {
    /// Whether the desired state was actually observed.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Number of probe invocations performed before termination.
    pub fn ticks(&self) -> u32 {
        match self {
            Self::Converged { ticks, .. } | Self::GaveUp { ticks, .. } | Self::Cancelled { ticks } => {
                *ticks
            }
        }
    }

    /// The final snapshot, if the watch ran to a terminal fetch.
    pub fn instances(&self) -> Option<&[ServerInstance]> {
        match self {
            Self::Converged { instances, .. } | Self::GaveUp { instances, .. } => Some(instances),
            Self::Cancelled { .. } => None,
        }
    }
}
