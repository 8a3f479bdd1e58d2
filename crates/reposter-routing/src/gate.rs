//! Operator authorization

use std::sync::Arc;

use reposter_core::Identity;

use crate::RoutingTable;

/// Decides who may run operator commands.
///
/// An empty operator list admits everyone so a fresh deployment can
/// bootstrap itself; after the first operator is added only listed
/// operators pass. Relay forwarding does not go through the gate.
#[derive(Clone, Debug)]
pub struct AuthorizationGate {
    table: Arc<RoutingTable>,
}

impl AuthorizationGate {
    pub fn new(table: Arc<RoutingTable>) -> Self {
        AuthorizationGate { table }
    }

    /// Unknown actors never pass, even in bootstrap mode
    pub fn is_privileged(&self, actor: Option<Identity>) -> bool {
        let Some(actor) = actor else {
            return false;
        };
        self.table
            .read(|record| record.operators.is_empty() || record.operators.contains(actor))
    }
}
