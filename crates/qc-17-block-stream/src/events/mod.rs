//! Event schemas
//!
//! - Inbound: consensus rounds driving assembly
//! - Outbound: closed and finalized block summaries

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
