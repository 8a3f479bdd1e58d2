//! Operator command grammar
//!
//! Commands are slash-prefixed words with at most one argument:
//! `/admin 42`, `/chan -1001234`, `/ls`. A `@botname` suffix on the verb is
//! accepted and ignored.

use crate::{Identity, ReposterError, ReposterResult, Role};

/// Command vocabulary
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `/help`, `/status`
    ShowStatus,
    /// `/admin <id>`
    AddOperator,
    /// `/chan <id>`
    AddSource,
    /// `/chat <id>`, `/add <id>`
    AddSink,
    /// `/shutdown <anything>`
    Shutdown,
    /// `/ls`
    ListSinks,
    /// `/ok`, answered for anyone
    Ping,
}

impl Verb {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "help" | "status" => Some(Verb::ShowStatus),
            "admin" => Some(Verb::AddOperator),
            "chan" => Some(Verb::AddSource),
            "chat" | "add" => Some(Verb::AddSink),
            "shutdown" => Some(Verb::Shutdown),
            "ls" => Some(Verb::ListSinks),
            "ok" => Some(Verb::Ping),
            _ => None,
        }
    }

    /// Routing list mutated by this verb, if any
    pub fn target_role(self) -> Option<Role> {
        match self {
            Verb::AddOperator => Some(Role::Operator),
            Verb::AddSource => Some(Role::Source),
            Verb::AddSink => Some(Role::Sink),
            _ => None,
        }
    }

    /// Whether the verb belongs to the operator-only group
    pub fn is_privileged(self) -> bool {
        !matches!(self, Verb::Ping)
    }
}

/// A parsed command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    /// First whitespace-separated word after the verb
    pub argument: Option<String>,
}

impl Command {
    /// Parse command text. Returns `None` for non-commands and unknown verbs.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let mut words = rest.split_whitespace();
        let head = words.next()?;
        let name = head.split_once('@').map_or(head, |(name, _)| name);
        let verb = Verb::from_name(name)?;
        Some(Command {
            verb,
            argument: words.next().map(str::to_string),
        })
    }

    /// The argument as an identity
    pub fn identity(&self) -> ReposterResult<Identity> {
        self.argument
            .as_deref()
            .ok_or(ReposterError::MissingArgument)?
            .parse()
    }
}

/// Vocabulary summary appended to the status reply
pub const COMMAND_HELP: &str = "/admin <id> - add operator\n\
/chan <id> - add source\n\
/chat <id> - add sink (alias /add)\n\
/ls - list sinks\n\
/shutdown <confirm> - stop the relay";
