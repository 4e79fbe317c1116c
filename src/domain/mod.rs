//! Domain layer for the hostwatch coordination core.
//!
//! Contains the instance and transition models, the error taxonomy,
//! and the port traits that external collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConsoleError, ConsoleResult};
