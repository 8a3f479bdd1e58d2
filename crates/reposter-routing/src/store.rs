//! Durable backing for the routing record

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use reposter_core::{ReposterError, ReposterResult};

use crate::TableRecord;

/// Where the routing record lives
pub trait TableStore: Send + Sync {
    /// Human-readable location, used in errors and logs
    fn origin(&self) -> String;

    fn load(&self) -> ReposterResult<TableRecord>;

    /// Write the full record. Must either complete or leave the previous
    /// content in place.
    fn save(&self, record: &TableRecord) -> ReposterResult<()>;
}

/// JSON file on local disk
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Write to a sibling temp file, then rename over the target
    fn atomic_write(&self, content: &[u8]) -> io::Result<()> {
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, content)?;
        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl TableStore for FileStore {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> ReposterResult<TableRecord> {
        let bytes = std::fs::read(&self.path).map_err(|e| ReposterError::StorageRead {
            origin: self.origin(),
            reason: e.to_string(),
        })?;
        TableRecord::decode(&bytes, &self.origin())
    }

    fn save(&self, record: &TableRecord) -> ReposterResult<()> {
        let bytes = record.encode(&self.origin())?;
        self.atomic_write(&bytes)
            .map_err(|e| ReposterError::StorageWrite {
                origin: self.origin(),
                reason: e.to_string(),
            })
    }
}

/// In-process store with write-failure injection
#[derive(Debug, Default)]
pub struct MemoryStore {
    content: Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Store pre-seeded with an encoded record
    pub fn with_record(record: &TableRecord) -> ReposterResult<Self> {
        let store = MemoryStore::new();
        *store.content.lock() = Some(record.encode("memory")?);
        Ok(store)
    }

    /// Store pre-seeded with raw bytes, valid or not
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let store = MemoryStore::new();
        *store.content.lock() = Some(bytes.into());
        store
    }

    /// Make subsequent saves fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw bytes of the last successful save
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.content.lock().clone()
    }

    /// Decoded content of the last successful save
    pub fn stored(&self) -> Option<TableRecord> {
        let bytes = self.bytes()?;
        TableRecord::decode(&bytes, "memory").ok()
    }
}

impl TableStore for MemoryStore {
    fn origin(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> ReposterResult<TableRecord> {
        let content = self.content.lock();
        let bytes = content.as_deref().ok_or_else(|| ReposterError::StorageRead {
            origin: self.origin(),
            reason: "no record stored".to_string(),
        })?;
        TableRecord::decode(bytes, &self.origin())
    }

    fn save(&self, record: &TableRecord) -> ReposterResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ReposterError::StorageWrite {
                origin: self.origin(),
                reason: "injected write failure".to_string(),
            });
        }
        let bytes = record.encode(&self.origin())?;
        *self.content.lock() = Some(bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl<S: TableStore + ?Sized> TableStore for std::sync::Arc<S> {
    fn origin(&self) -> String {
        (**self).origin()
    }

    fn load(&self) -> ReposterResult<TableRecord> {
        (**self).load()
    }

    fn save(&self, record: &TableRecord) -> ReposterResult<()> {
        (**self).save(record)
    }
}
