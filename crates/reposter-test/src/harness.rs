//! Relay harness - a node wired to an in-memory table and a chaos transport

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use reposter_core::{ChatKind, Identity, InboundEvent, Payload};
use reposter_routing::{MemoryStore, RoutingTable, TableRecord};
use reposter_runtime::{Handled, Node};

use crate::{ChaosConfig, ChaosTransport};

/// Builder for [`RelayHarness`]
#[derive(Clone, Debug, Default)]
pub struct HarnessBuilder {
    record: TableRecord,
    chaos: ChaosConfig,
}

impl HarnessBuilder {
    pub fn operators(mut self, ids: &[i64]) -> Self {
        self.record.operators = ids.iter().copied().map(Identity).collect();
        self
    }

    pub fn sources(mut self, ids: &[i64]) -> Self {
        self.record.sources = ids.iter().copied().map(Identity).collect();
        self
    }

    pub fn sinks(mut self, ids: &[i64]) -> Self {
        self.record.sinks = ids.iter().copied().map(Identity).collect();
        self
    }

    pub fn chaos(mut self, chaos: ChaosConfig) -> Self {
        self.chaos = chaos;
        self
    }

    pub fn build(self) -> RelayHarness {
        let store = Arc::new(
            MemoryStore::with_record(&self.record).expect("in-memory record always encodes"),
        );
        let table = Arc::new(
            RoutingTable::load(Arc::clone(&store)).expect("in-memory record always decodes"),
        );
        let transport = Arc::new(ChaosTransport::new(self.chaos));
        RelayHarness {
            node: Node::new(table, Arc::clone(&transport)),
            transport,
            store,
            next_message_id: AtomicI64::new(1),
        }
    }
}

/// A running relay under test
pub struct RelayHarness {
    pub node: Node<ChaosTransport>,
    pub transport: Arc<ChaosTransport>,
    pub store: Arc<MemoryStore>,
    next_message_id: AtomicI64,
}

impl RelayHarness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    pub fn table(&self) -> &Arc<RoutingTable> {
        self.node.table()
    }

    fn message_id(&self) -> i64 {
        self.next_message_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Private message from `actor`
    pub async fn command(&mut self, actor: i64, text: &str) -> Handled {
        let event = InboundEvent::private_text(Identity(actor), self.message_id(), text);
        self.node.handle(event).await
    }

    /// Private message whose sender the transport could not resolve
    pub async fn anonymous_command(&mut self, chat: i64, text: &str) -> Handled {
        let event = InboundEvent::single(
            Identity(chat),
            None,
            ChatKind::Private,
            Payload::text(self.message_id(), text),
        );
        self.node.handle(event).await
    }

    /// Channel post in `origin`
    pub async fn post(&mut self, origin: i64, text: &str) -> Handled {
        let event = InboundEvent::channel_post(Identity(origin), Payload::text(self.message_id(), text));
        self.node.handle(event).await
    }

    /// Album of `items` attachments in channel `origin`
    pub async fn album(&mut self, origin: i64, items: usize) -> Handled {
        let payloads = (0..items)
            .map(|i| Payload::data(self.message_id(), vec![i as u8; 16]))
            .collect();
        let event = InboundEvent::album(Identity(origin), None, ChatKind::Channel, payloads);
        self.node.handle(event).await
    }
}
