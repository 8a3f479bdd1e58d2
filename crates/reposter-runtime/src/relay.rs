//! Fan-out of source posts to sinks

use std::sync::Arc;

use reposter_core::{InboundEvent, Role};
use reposter_routing::RoutingTable;
use reposter_transport::EventSink;

/// Result of one forward pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Origin is not a registered source
    Ignored,
    /// One attempt per distinct sink; `failed` of them did not go through
    Relayed { attempted: usize, failed: usize },
}

/// Relay engine.
///
/// Consults source membership only; the operator gate plays no part here.
pub struct RelayEngine<S> {
    table: Arc<RoutingTable>,
    sink: Arc<S>,
}

impl<S: EventSink> RelayEngine<S> {
    pub fn new(table: Arc<RoutingTable>, sink: Arc<S>) -> Self {
        RelayEngine { table, sink }
    }

    /// Forward `event` to every sink.
    ///
    /// Never fails: a sink that rejects the event is logged and skipped, the
    /// rest still get their attempt. Albums go out as one unit per sink.
    pub async fn forward(&self, event: &InboundEvent) -> ForwardOutcome {
        if !self.table.contains(Role::Source, event.origin) {
            tracing::debug!(origin = %event.origin, "origin is not a source, ignoring");
            return ForwardOutcome::Ignored;
        }

        // Snapshot taken under the table lock; deliveries run without it
        let sinks = self.table.sink_snapshot();
        let mut failed = 0;
        for &sink in &sinks {
            if let Err(e) = self.sink.deliver(sink, event).await {
                failed += 1;
                tracing::warn!(%sink, origin = %event.origin, error = %e, "error while forwarding");
            }
        }

        tracing::debug!(
            origin = %event.origin,
            items = event.body.len(),
            attempted = sinks.len(),
            failed,
            "event relayed"
        );
        ForwardOutcome::Relayed {
            attempted: sinks.len(),
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use reposter_core::{ChatKind, Identity, Payload, ReposterError, ReposterResult};
    use reposter_routing::{MemoryStore, TableRecord};

    #[derive(Default)]
    struct Recorder {
        attempts: Mutex<Vec<Identity>>,
        failing: Vec<Identity>,
    }

    impl EventSink for Recorder {
        async fn deliver(&self, sink: Identity, _event: &InboundEvent) -> ReposterResult<()> {
            self.attempts.lock().push(sink);
            if self.failing.contains(&sink) {
                return Err(ReposterError::DeliveryFailed {
                    sink,
                    reason: "bot was kicked".into(),
                });
            }
            Ok(())
        }
    }

    fn table(sources: &[i64], sinks: &[i64]) -> Arc<RoutingTable> {
        let record = TableRecord {
            sources: sources.iter().copied().map(Identity).collect(),
            sinks: sinks.iter().copied().map(Identity).collect(),
            ..Default::default()
        };
        Arc::new(RoutingTable::load(MemoryStore::with_record(&record).unwrap()).unwrap())
    }

    #[tokio::test]
    async fn test_unregistered_origin_makes_no_attempts() {
        let recorder = Arc::new(Recorder::default());
        let engine = RelayEngine::new(table(&[100], &[200, 300]), Arc::clone(&recorder));

        let post = InboundEvent::channel_post(Identity(101), Payload::text(1, "spam"));
        assert_eq!(engine.forward(&post).await, ForwardOutcome::Ignored);
        assert!(recorder.attempts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_fan_out() {
        let recorder = Arc::new(Recorder {
            failing: vec![Identity(200)],
            ..Default::default()
        });
        let engine = RelayEngine::new(table(&[100], &[200, 300]), Arc::clone(&recorder));

        let post = InboundEvent::channel_post(Identity(100), Payload::text(1, "news"));
        assert_eq!(
            engine.forward(&post).await,
            ForwardOutcome::Relayed {
                attempted: 2,
                failed: 1
            }
        );
        assert_eq!(*recorder.attempts.lock(), vec![Identity(200), Identity(300)]);
    }

    #[tokio::test]
    async fn test_album_delivered_once_per_sink() {
        let recorder = Arc::new(Recorder::default());
        let engine = RelayEngine::new(table(&[100], &[200, 200, 300]), Arc::clone(&recorder));

        let album = InboundEvent::album(
            Identity(100),
            None,
            ChatKind::Channel,
            vec![Payload::data(1, vec![0u8; 4]), Payload::data(2, vec![1u8; 4])],
        );
        let outcome = engine.forward(&album).await;
        assert_eq!(
            outcome,
            ForwardOutcome::Relayed {
                attempted: 2,
                failed: 0
            }
        );
        assert_eq!(*recorder.attempts.lock(), vec![Identity(200), Identity(300)]);
    }

    #[tokio::test]
    async fn test_source_with_no_sinks() {
        let recorder = Arc::new(Recorder::default());
        let engine = RelayEngine::new(table(&[100], &[]), Arc::clone(&recorder));
        let post = InboundEvent::channel_post(Identity(100), Payload::text(1, "x"));
        assert_eq!(
            engine.forward(&post).await,
            ForwardOutcome::Relayed {
                attempted: 0,
                failed: 0
            }
        );
    }
}
