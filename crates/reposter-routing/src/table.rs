//! Routing table - lock-guarded record with write-after-mutate persistence
//!
//! Every mutation is staged on a copy of the record, written to the store,
//! and only then committed to memory. A failed write leaves memory exactly
//! as it was, so memory always matches the last successful write.

use parking_lot::Mutex;

use reposter_core::{Identity, ReposterResult, Role};

use crate::{FileStore, TableRecord, TableStore};

/// List sizes, as shown by the status command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub operators: usize,
    pub sources: usize,
    pub sinks: usize,
}

/// Routing table shared by the gate, the command processor and the relay
pub struct RoutingTable {
    store: Box<dyn TableStore>,
    /// Held across the persist step so concurrent mutations cannot lose writes
    record: Mutex<TableRecord>,
}

impl RoutingTable {
    /// Load the table from a store
    pub fn load(store: impl TableStore + 'static) -> ReposterResult<Self> {
        let record = store.load()?;
        tracing::info!(
            origin = %store.origin(),
            operators = record.operators.len(),
            sources = record.sources.len(),
            sinks = record.sinks.len(),
            "routing table loaded"
        );
        Ok(RoutingTable {
            store: Box::new(store),
            record: Mutex::new(record),
        })
    }

    /// Load the table from a JSON file
    pub fn open(path: impl Into<std::path::PathBuf>) -> ReposterResult<Self> {
        Self::load(FileStore::new(path))
    }

    /// Persistence location
    pub fn origin(&self) -> String {
        self.store.origin()
    }

    /// Write the current record without changing it
    pub fn persist(&self) -> ReposterResult<()> {
        let record = self.record.lock();
        self.store.save(&record)
    }

    /// Append `id` to the list for `role` and persist.
    ///
    /// On a failed write the append is discarded.
    pub fn add(&self, role: Role, id: Identity) -> ReposterResult<()> {
        let mut record = self.record.lock();
        let mut staged = record.clone();
        staged.list_mut(role).push(id);

        if let Err(e) = self.store.save(&staged) {
            tracing::warn!(%role, %id, error = %e, "routing table write failed, change discarded");
            return Err(e);
        }

        *record = staged;
        tracing::info!(%role, %id, "routing table updated");
        Ok(())
    }

    pub fn add_operator(&self, id: Identity) -> ReposterResult<()> {
        self.add(Role::Operator, id)
    }

    pub fn add_source(&self, id: Identity) -> ReposterResult<()> {
        self.add(Role::Source, id)
    }

    pub fn add_sink(&self, id: Identity) -> ReposterResult<()> {
        self.add(Role::Sink, id)
    }

    /// Membership test
    pub fn contains(&self, role: Role, id: Identity) -> bool {
        self.record.lock().list(role).contains(id)
    }

    pub fn counts(&self) -> TableCounts {
        let record = self.record.lock();
        TableCounts {
            operators: record.operators.len(),
            sources: record.sources.len(),
            sinks: record.sinks.len(),
        }
    }

    /// Sink list as stored, duplicates included
    pub fn sinks(&self) -> Vec<Identity> {
        self.record.lock().sinks.as_slice().to_vec()
    }

    /// Distinct sinks in insertion order, copied out under the lock
    pub fn sink_snapshot(&self) -> Vec<Identity> {
        self.record.lock().sinks.distinct()
    }

    /// Copy of the whole record
    pub fn snapshot(&self) -> TableRecord {
        self.record.lock().clone()
    }

    /// Run `f` against the record while holding the lock
    pub fn read<R>(&self, f: impl FnOnce(&TableRecord) -> R) -> R {
        f(&self.record.lock())
    }
}

impl std::fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingTable")
            .field("origin", &self.origin())
            .field("record", &*self.record.lock())
            .finish()
    }
}
