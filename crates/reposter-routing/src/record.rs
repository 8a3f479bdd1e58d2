//! Persisted routing record

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use reposter_core::{Identity, ReposterError, ReposterResult, Role};

/// Credential that must never reach a log line
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Ordered identity list with a membership index.
///
/// Duplicates are stored as appended; the index only answers membership.
/// A list read as JSON `null` is empty and is written back as `null` until
/// something is pushed onto it.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "Option<Vec<Identity>>", into = "Option<Vec<Identity>>")]
pub struct IdentityList {
    entries: Vec<Identity>,
    index: HashSet<Identity>,
    null: bool,
}

impl IdentityList {
    pub fn new() -> Self {
        IdentityList::default()
    }

    pub fn push(&mut self, id: Identity) {
        self.null = false;
        self.entries.push(id);
        self.index.insert(id);
    }

    pub fn contains(&self, id: Identity) -> bool {
        self.index.contains(&id)
    }

    /// Number of stored entries, duplicates included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Identity] {
        &self.entries
    }

    /// Entries in insertion order with repeats removed
    pub fn distinct(&self) -> Vec<Identity> {
        let mut seen = HashSet::with_capacity(self.index.len());
        self.entries
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

impl From<Vec<Identity>> for IdentityList {
    fn from(entries: Vec<Identity>) -> Self {
        let index = entries.iter().copied().collect();
        IdentityList {
            entries,
            index,
            null: false,
        }
    }
}

impl From<Option<Vec<Identity>>> for IdentityList {
    fn from(entries: Option<Vec<Identity>>) -> Self {
        match entries {
            Some(entries) => IdentityList::from(entries),
            None => IdentityList {
                null: true,
                ..IdentityList::default()
            },
        }
    }
}

impl From<IdentityList> for Option<Vec<Identity>> {
    fn from(list: IdentityList) -> Self {
        if list.null {
            None
        } else {
            Some(list.entries)
        }
    }
}

impl FromIterator<Identity> for IdentityList {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        IdentityList::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl PartialEq for IdentityList {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for IdentityList {}

impl fmt::Debug for IdentityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

/// Everything the relay persists.
///
/// Field order is the on-disk order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRecord {
    pub token: Secret,
    #[serde(rename = "admin-list")]
    pub operators: IdentityList,
    #[serde(rename = "channel-ids")]
    pub sources: IdentityList,
    #[serde(rename = "list-of-chats")]
    pub sinks: IdentityList,
}

impl TableRecord {
    pub fn list(&self, role: Role) -> &IdentityList {
        match role {
            Role::Operator => &self.operators,
            Role::Source => &self.sources,
            Role::Sink => &self.sinks,
        }
    }

    pub fn list_mut(&mut self, role: Role) -> &mut IdentityList {
        match role {
            Role::Operator => &mut self.operators,
            Role::Source => &mut self.sources,
            Role::Sink => &mut self.sinks,
        }
    }

    /// Compact JSON encoding
    pub fn encode(&self, origin: &str) -> ReposterResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ReposterError::StorageWrite {
            origin: origin.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn decode(bytes: &[u8], origin: &str) -> ReposterResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| ReposterError::StorageMalformed {
            origin: origin.to_string(),
            reason: e.to_string(),
        })
    }
}
