//! Operator command execution
//!
//! Authorization happens before this point: the processor assumes the
//! caller already passed the gate for privileged verbs.

use std::sync::Arc;

use reposter_core::{Command, Reaction, ReposterError, Verb, COMMAND_HELP};
use reposter_routing::RoutingTable;

pub const NO_ID_REPLY: &str = "no id, provide it in the same message, /help?";
pub const PARSE_ERROR_REPLY: &str = "error parsing id";
pub const STORAGE_ERROR_REPLY: &str = "error adding to config";
pub const SHUTDOWN_HINT_REPLY: &str = "send /shutdown with any argument to confirm, /help?";
pub const PING_REPLY: &str = "OK";

/// What the sender gets back
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Full text reply
    Reply(String),
    /// Acknowledgement marker only
    React(Reaction),
    /// Stop accepting events
    Shutdown,
}

/// Executes parsed commands against the routing table
#[derive(Clone, Debug)]
pub struct CommandProcessor {
    table: Arc<RoutingTable>,
}

impl CommandProcessor {
    pub fn new(table: Arc<RoutingTable>) -> Self {
        CommandProcessor { table }
    }

    pub fn execute(&self, command: &Command) -> CommandOutcome {
        match command.verb {
            Verb::ShowStatus => CommandOutcome::Reply(self.status()),
            Verb::AddOperator | Verb::AddSource | Verb::AddSink => self.add(command),
            Verb::Shutdown => {
                if command.argument.is_some() {
                    CommandOutcome::Shutdown
                } else {
                    CommandOutcome::Reply(SHUTDOWN_HINT_REPLY.to_string())
                }
            }
            Verb::ListSinks => self.list_sinks(),
            Verb::Ping => CommandOutcome::Reply(PING_REPLY.to_string()),
        }
    }

    fn status(&self) -> String {
        let counts = self.table.counts();
        format!(
            "operators: {}, sources: {}, sinks: {}\n{}",
            counts.operators, counts.sources, counts.sinks, COMMAND_HELP
        )
    }

    fn add(&self, command: &Command) -> CommandOutcome {
        let Some(role) = command.verb.target_role() else {
            return CommandOutcome::React(Reaction::Dislike);
        };

        let id = match command.identity() {
            Ok(id) => id,
            Err(ReposterError::MissingArgument) => {
                return CommandOutcome::Reply(NO_ID_REPLY.to_string())
            }
            Err(_) => return CommandOutcome::Reply(PARSE_ERROR_REPLY.to_string()),
        };

        match self.table.add(role, id) {
            Ok(()) => CommandOutcome::React(Reaction::Like),
            Err(e) => {
                tracing::warn!(%role, %id, error = %e, "command rejected");
                CommandOutcome::Reply(STORAGE_ERROR_REPLY.to_string())
            }
        }
    }

    fn list_sinks(&self) -> CommandOutcome {
        match serde_json::to_string_pretty(&self.table.sinks()) {
            Ok(listing) => CommandOutcome::Reply(listing),
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize sink list");
                CommandOutcome::React(Reaction::Dislike)
            }
        }
    }
}
