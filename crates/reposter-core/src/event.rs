//! Inbound event definitions
//!
//! An inbound event is whatever the transport hands the relay: a post in a
//! channel, a message in a group, or a private message that may carry an
//! operator command. The relay never looks inside payload data.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Command, Identity, Verb};

/// Kind of chat an event arrived in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// One-to-one conversation with the relay
    Private,
    #[default]
    Group,
    Channel,
}

/// One message as delivered by the transport
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Transport-assigned id of the original message
    #[serde(default)]
    pub message_id: i64,
    /// Message text or caption, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Opaque attachment data
    #[serde(default, skip_serializing_if = "Bytes::is_empty")]
    pub data: Bytes,
}

impl Payload {
    pub fn text(message_id: i64, text: impl Into<String>) -> Self {
        Payload {
            message_id,
            text: Some(text.into()),
            data: Bytes::new(),
        }
    }

    pub fn data(message_id: i64, data: impl Into<Bytes>) -> Self {
        Payload {
            message_id,
            text: None,
            data: data.into(),
        }
    }
}

/// Event contents
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum EventBody {
    /// A single message
    Single(Payload),
    /// Several messages grouped into one logical unit
    Album(Vec<Payload>),
}

impl EventBody {
    pub fn payloads(&self) -> &[Payload] {
        match self {
            EventBody::Single(p) => std::slice::from_ref(p),
            EventBody::Album(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.payloads().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads().is_empty()
    }
}

/// Path an event takes through the relay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Command,
    Content,
}

/// Event handed to the relay by the transport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Feed or chat the event came from
    pub origin: Identity,
    /// Who sent it. Absent when the transport cannot tell (e.g. anonymous
    /// channel posts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Identity>,
    #[serde(default)]
    pub chat: ChatKind,
    pub body: EventBody,
}

impl InboundEvent {
    /// A single message
    pub fn single(origin: Identity, actor: Option<Identity>, chat: ChatKind, payload: Payload) -> Self {
        InboundEvent {
            origin,
            actor,
            chat,
            body: EventBody::Single(payload),
        }
    }

    /// An album of messages
    pub fn album(origin: Identity, actor: Option<Identity>, chat: ChatKind, items: Vec<Payload>) -> Self {
        InboundEvent {
            origin,
            actor,
            chat,
            body: EventBody::Album(items),
        }
    }

    /// A channel post with no resolvable author
    pub fn channel_post(origin: Identity, payload: Payload) -> Self {
        Self::single(origin, None, ChatKind::Channel, payload)
    }

    /// A private text message from `sender`
    pub fn private_text(sender: Identity, message_id: i64, text: impl Into<String>) -> Self {
        Self::single(
            sender,
            Some(sender),
            ChatKind::Private,
            Payload::text(message_id, text),
        )
    }

    /// Command text, if this event is a command.
    ///
    /// Single private messages starting with `/` are commands. In a group
    /// only the public `/ok` is; any other slash text there, and everything
    /// in a channel, is ordinary content.
    pub fn command_text(&self) -> Option<&str> {
        let text = match &self.body {
            EventBody::Single(payload) => payload.text.as_deref()?,
            EventBody::Album(_) => return None,
        };
        if !text.starts_with('/') {
            return None;
        }
        match self.chat {
            ChatKind::Private => Some(text),
            ChatKind::Group => Command::parse(text)
                .filter(|command| command.verb == Verb::Ping)
                .map(|_| text),
            ChatKind::Channel => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        if self.command_text().is_some() {
            EventKind::Command
        } else {
            EventKind::Content
        }
    }

    /// Id of the first message, used to address replies and reactions
    pub fn message_id(&self) -> Option<i64> {
        self.body.payloads().first().map(|p| p.message_id)
    }
}

/// Lightweight acknowledgement marker, distinct from a text reply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Dislike,
}
