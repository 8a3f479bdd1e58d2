//! Reposter node - event classification and the run loop

use std::sync::Arc;

use tokio::sync::watch;

use reposter_core::{Command, EventKind, InboundEvent};
use reposter_routing::{AuthorizationGate, RoutingTable};
use reposter_transport::{EventSink, EventSource, Responder};

use crate::{CommandOutcome, CommandProcessor, ForwardOutcome, RelayEngine};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub events_in: u64,
    pub commands_handled: u64,
    /// Privileged commands from non-operators, dropped without an answer
    pub commands_dropped: u64,
    pub commands_unknown: u64,
    pub events_relayed: u64,
    pub events_ignored: u64,
    pub deliveries_attempted: u64,
    pub deliveries_failed: u64,
    pub response_failures: u64,
}

/// What happened to one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Handled {
    Command(CommandOutcome),
    /// Privileged command from an unprivileged sender
    Dropped,
    UnknownCommand,
    Forwarded(ForwardOutcome),
}

/// Cooperative shutdown signal
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Shutdown { tx: Arc::new(tx) }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Reposter node - the runtime entity
pub struct Node<T> {
    table: Arc<RoutingTable>,
    gate: AuthorizationGate,
    commands: CommandProcessor,
    relay: RelayEngine<T>,
    /// Answers commands; the relay engine holds the same transport for deliveries
    transport: Arc<T>,
    shutdown: Shutdown,
    stats: RuntimeStats,
}

impl<T: EventSink + Responder> Node<T> {
    pub fn new(table: Arc<RoutingTable>, transport: Arc<T>) -> Self {
        Node {
            gate: AuthorizationGate::new(Arc::clone(&table)),
            commands: CommandProcessor::new(Arc::clone(&table)),
            relay: RelayEngine::new(Arc::clone(&table), Arc::clone(&transport)),
            table,
            transport,
            shutdown: Shutdown::new(),
            stats: RuntimeStats::default(),
        }
    }

    pub fn table(&self) -> &Arc<RoutingTable> {
        &self.table
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Handle for stopping the node from outside (e.g. on ctrl-c)
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Handle one inbound event to completion
    pub async fn handle(&mut self, event: InboundEvent) -> Handled {
        self.stats.events_in += 1;
        match event.kind() {
            EventKind::Command => self.handle_command(&event).await,
            EventKind::Content => self.handle_content(&event).await,
        }
    }

    async fn handle_command(&mut self, event: &InboundEvent) -> Handled {
        let Some(command) = event.command_text().and_then(Command::parse) else {
            self.stats.commands_unknown += 1;
            tracing::debug!(origin = %event.origin, "unknown command ignored");
            return Handled::UnknownCommand;
        };

        // Silence towards non-operators keeps the command set hidden
        if command.verb.is_privileged() && !self.gate.is_privileged(event.actor) {
            self.stats.commands_dropped += 1;
            tracing::debug!(origin = %event.origin, actor = ?event.actor, verb = ?command.verb, "unprivileged command dropped");
            return Handled::Dropped;
        }

        self.stats.commands_handled += 1;
        let outcome = self.commands.execute(&command);
        self.respond(event, &outcome).await;
        Handled::Command(outcome)
    }

    async fn handle_content(&mut self, event: &InboundEvent) -> Handled {
        let outcome = self.relay.forward(event).await;
        match outcome {
            ForwardOutcome::Ignored => self.stats.events_ignored += 1,
            ForwardOutcome::Relayed { attempted, failed } => {
                self.stats.events_relayed += 1;
                self.stats.deliveries_attempted += attempted as u64;
                self.stats.deliveries_failed += failed as u64;
            }
        }
        Handled::Forwarded(outcome)
    }

    async fn respond(&mut self, event: &InboundEvent, outcome: &CommandOutcome) {
        let result = match outcome {
            CommandOutcome::Reply(text) => self.transport.reply(event, text).await,
            CommandOutcome::React(reaction) => self.transport.react(event, *reaction).await,
            CommandOutcome::Shutdown => {
                tracing::info!(actor = ?event.actor, "shutdown requested");
                self.shutdown.trigger();
                Ok(())
            }
        };
        if let Err(e) = result {
            self.stats.response_failures += 1;
            tracing::warn!(chat = %event.origin, error = %e, "failed to answer command");
        }
    }

    /// Pull events from `source` until it ends or shutdown is signalled.
    ///
    /// The event being handled when shutdown arrives runs to completion;
    /// nothing after it is started.
    pub async fn run<S: EventSource>(&mut self, source: &mut S) {
        let mut signal = self.shutdown.subscribe();
        tracing::info!(origin = %self.table.origin(), "relay started");

        loop {
            if *signal.borrow() {
                break;
            }
            let event = tokio::select! {
                biased;
                changed = signal.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                event = source.next_event() => event,
            };
            match event {
                Some(event) => {
                    self.handle(event).await;
                }
                None => {
                    tracing::info!("event source exhausted");
                    break;
                }
            }
        }

        let stats = &self.stats;
        tracing::info!(
            events = stats.events_in,
            commands = stats.commands_handled,
            dropped = stats.commands_dropped,
            relayed = stats.events_relayed,
            ignored = stats.events_ignored,
            deliveries = stats.deliveries_attempted,
            delivery_failures = stats.deliveries_failed,
            "relay stopped"
        );
    }
}
