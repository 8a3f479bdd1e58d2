//! Reposter Transport - How events get in and deliveries get out
//!
//! This crate provides:
//! - The `EventSource`, `EventSink` and `Responder` seams the relay is written against
//! - An in-process channel transport (used by tests and embedders)
//! - A newline-delimited JSON transport over stdio for external bot adapters

use std::future::Future;

use reposter_core::{Identity, InboundEvent, Reaction, ReposterResult};

pub mod outbound;
pub mod channel;
pub mod ndjson;

pub use outbound::*;
pub use channel::*;
pub use ndjson::*;

/// Produces inbound events, one at a time
pub trait EventSource: Send {
    /// Next event, or `None` once the source is exhausted
    fn next_event(&mut self) -> impl Future<Output = Option<InboundEvent>> + Send;
}

/// Performs a single delivery attempt to one destination.
///
/// Retries, if any, belong to the implementation.
pub trait EventSink: Send + Sync {
    fn deliver(
        &self,
        sink: Identity,
        event: &InboundEvent,
    ) -> impl Future<Output = ReposterResult<()>> + Send;
}

/// Answers the sender of a command
pub trait Responder: Send + Sync {
    /// Full text reply
    fn reply(&self, to: &InboundEvent, text: &str) -> impl Future<Output = ReposterResult<()>> + Send;

    /// Lightweight acknowledgement marker
    fn react(
        &self,
        to: &InboundEvent,
        reaction: Reaction,
    ) -> impl Future<Output = ReposterResult<()>> + Send;
}
