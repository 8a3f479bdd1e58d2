//! Outbound actions emitted by the relay

use serde::{Deserialize, Serialize};

use reposter_core::{EventBody, Identity, InboundEvent, Reaction};

/// One thing the relay asks the transport to do
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outbound {
    /// Forward `body`, originally posted in `from`, to `to`
    Forward {
        to: Identity,
        from: Identity,
        body: EventBody,
    },
    /// Text reply in the chat a command came from
    Reply {
        chat: Identity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_to: Option<i64>,
        text: String,
    },
    /// Reaction on the command message
    React {
        chat: Identity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<i64>,
        reaction: Reaction,
    },
}

impl Outbound {
    pub fn forward(to: Identity, event: &InboundEvent) -> Self {
        Outbound::Forward {
            to,
            from: event.origin,
            body: event.body.clone(),
        }
    }

    pub fn reply(to: &InboundEvent, text: &str) -> Self {
        Outbound::Reply {
            chat: to.origin,
            reply_to: to.message_id(),
            text: text.to_string(),
        }
    }

    pub fn react(to: &InboundEvent, reaction: Reaction) -> Self {
        Outbound::React {
            chat: to.origin,
            message_id: to.message_id(),
            reaction,
        }
    }

    /// Destination chat
    pub fn chat(&self) -> Identity {
        match self {
            Outbound::Forward { to, .. } => *to,
            Outbound::Reply { chat, .. } | Outbound::React { chat, .. } => *chat,
        }
    }
}
