//! # Node Runtime Library
//!
//! Exposes the node wiring for tests. The entry point is the `main.rs` binary.
//!
//! - [`config`]: environment-driven node configuration
//! - [`simulation`]: synthetic consensus rounds
//! - [`runtime`]: wiring of the block stream and its collaborators

#![warn(missing_docs)]

pub mod config;
pub mod runtime;
pub mod simulation;

pub use config::{NodeConfig, SimulationConfig};
pub use runtime::{NodeRuntime, RunSummary};
pub use simulation::SyntheticConsensus;
