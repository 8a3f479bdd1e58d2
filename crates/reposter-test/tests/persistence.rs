//! Routing table persistence across restarts

use std::sync::Arc;

use reposter_core::{Identity, Role};
use reposter_routing::{FileStore, RoutingTable, TableStore};
use reposter_runtime::Node;
use reposter_test::ChaosTransport;
use reposter_transport::inbound_channel;

const SEED: &str =
    r#"{"token":"123:abc","admin-list":[7],"channel-ids":[-100],"list-of-chats":[200]}"#;

#[test]
fn missing_table_is_fatal_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let err = RoutingTable::open(dir.path().join("config.json")).unwrap_err();
    assert!(err.is_storage());
}

#[test]
fn malformed_table_is_fatal_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{\"admin-list\": [1,").unwrap();
    assert!(RoutingTable::open(&path).unwrap_err().is_storage());
}

#[tokio::test]
async fn commands_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, SEED).unwrap();

    {
        let table = Arc::new(RoutingTable::open(&path).unwrap());
        let mut node = Node::new(table, Arc::new(ChaosTransport::reliable()));
        let (tx, mut source) = inbound_channel(8);
        for (i, text) in ["/chan -101", "/chat 300", "/admin 8"].iter().enumerate() {
            tx.send(reposter_core::InboundEvent::private_text(Identity(7), i as i64, *text))
                .await
                .unwrap();
        }
        drop(tx);
        node.run(&mut source).await;
    }

    let reloaded = RoutingTable::open(&path).unwrap();
    assert!(reloaded.contains(Role::Source, Identity(-101)));
    assert!(reloaded.contains(Role::Operator, Identity(8)));
    assert_eq!(reloaded.sinks(), vec![Identity(200), Identity(300)]);
    assert_eq!(reloaded.read(|r| r.token.expose().to_string()), "123:abc");
}

#[test]
fn reload_and_persist_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, SEED).unwrap();

    let table = RoutingTable::load(FileStore::new(&path)).unwrap();
    table.persist().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), SEED);
    assert_eq!(FileStore::new(&path).origin(), path.display().to_string());
}
