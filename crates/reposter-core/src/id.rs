//! Identity types
//!
//! Operators, sources and sinks all live in one identity space. Whether an
//! identity is a person or a feed depends only on which list it appears in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ReposterError;

/// Opaque principal or feed identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub i64);

impl FromStr for Identity {
    type Err = ReposterError;

    /// Parse a base-10 signed 64-bit identifier, as typed by an operator
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Identity)
            .map_err(|_| ReposterError::InvalidIdentity(s.to_string()))
    }
}

impl From<i64> for Identity {
    fn from(id: i64) -> Self {
        Identity(id)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which routing list an identity is registered in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Operator,
    Source,
    Sink,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::Source => "source",
            Role::Sink => "sink",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
