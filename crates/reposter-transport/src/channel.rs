//! In-process channel transport

use tokio::sync::mpsc;

use reposter_core::{Identity, InboundEvent, Reaction, ReposterError, ReposterResult};

use crate::{EventSink, EventSource, Outbound, Responder};

/// Inbound event sender half
pub type EventSender = mpsc::Sender<InboundEvent>;

/// Outbound action receiver half
pub type OutboundReceiver = mpsc::Receiver<Outbound>;

/// Event source fed through a bounded channel
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<InboundEvent>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<InboundEvent>) -> Self {
        ChannelSource { rx }
    }
}

impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Option<InboundEvent> {
        self.rx.recv().await
    }
}

/// Create a bounded inbound channel
pub fn inbound_channel(capacity: usize) -> (EventSender, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelSource::new(rx))
}

/// Move events from `source` onto a bounded channel read by the returned
/// source.
///
/// The reader task keeps pulling while the node is busy, so up to
/// `capacity` events queue up ahead of it. It stops when `source` ends or the
/// returned source is dropped.
pub fn start_receive_loop<S>(mut source: S, capacity: usize) -> ChannelSource
where
    S: EventSource + 'static,
{
    let (tx, rx) = inbound_channel(capacity.max(1));

    tokio::spawn(async move {
        while let Some(event) = source.next_event().await {
            if tx.send(event).await.is_err() {
                break; // Receiver dropped
            }
        }
        tracing::debug!("inbound reader finished");
    });

    rx
}

/// Sink and responder that push every action into a channel
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<Outbound>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Outbound>) -> Self {
        ChannelSink { tx }
    }

    async fn push(&self, action: Outbound) -> ReposterResult<()> {
        self.tx
            .send(action)
            .await
            .map_err(|_| ReposterError::TransportClosed)
    }
}

/// Create a bounded outbound channel
pub fn outbound_channel(capacity: usize) -> (ChannelSink, OutboundReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelSink::new(tx), rx)
}

impl EventSink for ChannelSink {
    async fn deliver(&self, sink: Identity, event: &InboundEvent) -> ReposterResult<()> {
        self.push(Outbound::forward(sink, event))
            .await
            .map_err(|e| ReposterError::DeliveryFailed {
                sink,
                reason: e.to_string(),
            })
    }
}

impl Responder for ChannelSink {
    async fn reply(&self, to: &InboundEvent, text: &str) -> ReposterResult<()> {
        self.push(Outbound::reply(to, text)).await
    }

    async fn react(&self, to: &InboundEvent, reaction: Reaction) -> ReposterResult<()> {
        self.push(Outbound::react(to, reaction)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposter_core::Payload;

    #[tokio::test]
    async fn test_source_drains_then_ends() {
        let (tx, mut source) = inbound_channel(4);
        let event = InboundEvent::channel_post(Identity(1), Payload::text(1, "a"));
        tx.send(event.clone()).await.unwrap();
        drop(tx);

        assert_eq!(source.next_event().await, Some(event));
        assert_eq!(source.next_event().await, None);
    }

    #[tokio::test]
    async fn test_receive_loop_forwards_in_order() {
        let input = concat!(
            "{\"origin\":1,\"body\":{\"type\":\"single\",\"items\":{\"message_id\":1}}}\n",
            "{\"origin\":2,\"body\":{\"type\":\"single\",\"items\":{\"message_id\":2}}}\n",
        );
        let mut source = start_receive_loop(crate::NdjsonSource::new(input.as_bytes()), 1);

        assert_eq!(source.next_event().await.unwrap().origin, Identity(1));
        assert_eq!(source.next_event().await.unwrap().origin, Identity(2));
        assert_eq!(source.next_event().await, None);
    }

    #[tokio::test]
    async fn test_receive_loop_tolerates_zero_capacity() {
        let (tx, inner) = inbound_channel(1);
        let mut source = start_receive_loop(inner, 0);
        let event = InboundEvent::channel_post(Identity(3), Payload::text(1, "a"));
        tx.send(event.clone()).await.unwrap();
        drop(tx);

        assert_eq!(source.next_event().await, Some(event));
        assert_eq!(source.next_event().await, None);
    }

    #[tokio::test]
    async fn test_sink_reports_closed_channel_as_delivery_failure() {
        let (sink, rx) = outbound_channel(1);
        drop(rx);
        let event = InboundEvent::channel_post(Identity(1), Payload::text(1, "a"));
        let err = sink.deliver(Identity(9), &event).await.unwrap_err();
        assert!(matches!(err, ReposterError::DeliveryFailed { sink, .. } if sink == Identity(9)));
    }

    #[tokio::test]
    async fn test_reactions_go_to_command_chat() {
        let (sink, mut rx) = outbound_channel(1);
        let cmd = InboundEvent::private_text(Identity(7), 5, "/admin 1");
        sink.react(&cmd, Reaction::Like).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(Outbound::React {
                chat: Identity(7),
                message_id: Some(5),
                reaction: Reaction::Like,
            })
        );
    }
}
