//! Reposter relay process
//!
//! Loads the routing table, then relays JSON-line events from stdin until
//! stdin closes, an operator sends `/shutdown <confirm>`, or ctrl-c.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use reposter_routing::RoutingTable;
use reposter_runtime::{telemetry, Cli, Node, RuntimeConfig};
use reposter_transport::{start_receive_loop, NdjsonSink, NdjsonSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RuntimeConfig::from(Cli::parse());
    telemetry::init_tracing(&config)?;

    // Unknown routing state is fatal
    let table = Arc::new(RoutingTable::open(&config.table_path)?);
    if table.read(|record| record.token.is_empty()) {
        tracing::warn!(origin = %table.origin(), "credential token is empty");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let capacity = config.channel_capacity;
    runtime.block_on(async move {
        let mut node = Node::new(table, Arc::new(NdjsonSink::stdout()));

        let shutdown = node.shutdown_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                shutdown.trigger();
            }
        });

        let mut source = start_receive_loop(NdjsonSource::stdin(), capacity);
        node.run(&mut source).await;
    });

    // A blocked stdin read must not hold the process open
    runtime.shutdown_timeout(Duration::from_millis(500));
    Ok(())
}
