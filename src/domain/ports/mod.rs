//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the trait interfaces external collaborators
//! implement:
//! - `HostInventoryStore`: the remote data-access boundary that
//!   enumerates instances and issues start/stop commands
//! - `InstanceView`: the presentation-facing callback that receives
//!   fully computed snapshots
//!
//! These traits keep the coordination core independent of the RPC
//! transport and of any rendering concern.

pub mod host_inventory;
pub mod instance_view;

pub use host_inventory::HostInventoryStore;
pub use instance_view::{InstanceView, NullInstanceView};
