//! Reposter Routing - Who may command the relay and where posts go
//!
//! This crate implements:
//! - The persisted record (credential token plus three identity lists)
//! - Stores that load and save the record (file, in-memory)
//! - The lock-guarded routing table with write-after-mutate semantics
//! - The operator authorization gate

pub mod record;
pub mod store;
pub mod table;
pub mod gate;

pub use record::*;
pub use store::*;
pub use table::*;
pub use gate::*;
