//! Reposter Runtime - Node orchestration and main loop
//!
//! Each inbound event takes one of two paths:
//! 1. Command: parse, authorize, execute against the routing table, answer
//! 2. Content: check the origin is a source, fan out to every sink
//!
//! Events are handled one at a time in arrival order until the source ends
//! or an operator shuts the relay down.

pub mod config;
pub mod telemetry;
pub mod relay;
pub mod commands;
pub mod node;

pub use config::*;
pub use relay::*;
pub use commands::*;
pub use node::*;
