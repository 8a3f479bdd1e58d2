//! Reposter Core - Fundamental types shared by every layer
//!
//! This crate defines:
//! - Identities (a single signed 64-bit space for people and feeds)
//! - Inbound events (commands, single posts and albums)
//! - The operator command grammar
//! - The error taxonomy

pub mod id;
pub mod event;
pub mod command;
pub mod error;

pub use id::*;
pub use event::*;
pub use command::*;
pub use error::*;
