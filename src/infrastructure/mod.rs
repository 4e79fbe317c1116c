//! Infrastructure layer
//!
//! Configuration loading and logging setup. The remote inventory and
//! the presentation surface are ports implemented by the embedding
//! application, not by this crate.

pub mod config;
pub mod logging;
