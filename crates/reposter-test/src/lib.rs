//! Reposter Test Harness - Chaos delivery and relay scenarios
//!
//! This crate provides:
//! - A recording transport that can fail deliveries on purpose
//! - A harness wiring a node to an in-memory routing table

pub mod chaos;
pub mod harness;

pub use chaos::*;
pub use harness::*;
