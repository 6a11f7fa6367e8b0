//! The memtable: a sorted in-memory write buffer handed to every writer and reader of
//! the store. Flushing a full one to disk is up to the caller.

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;

use crate::{Entry, SkipList, SkipListOptions, Storage};

#[derive(Debug, Clone)]
pub struct MemTable {
    storage: Arc<dyn Storage + Send + Sync>,
}

impl MemTable {
    pub fn new() -> MemTable {
        MemTable {
            storage: Arc::new(SkipList::new()),
        }
    }

    pub fn with_options(options: SkipListOptions) -> Result<MemTable> {
        let list = SkipList::with_options(options)?;
        Ok(MemTable {
            storage: Arc::new(list),
        })
    }

    pub fn put(&self, key: impl Into<Bytes>, value: impl Into<Bytes>) -> Result<()> {
        self.storage.put(Entry::new(key, value))
    }

    pub fn set(&self, entry: Entry) -> Result<()> {
        self.storage.put(entry)
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<Bytes>> {
        let entry = self.storage.get(key.as_ref())?;
        Ok(entry.map(|e| e.value))
    }

    pub fn get_entry(&self, key: impl AsRef<[u8]>) -> Result<Option<Entry>> {
        self.storage.get(key.as_ref())
    }

    pub fn close(&self) -> Result<()> {
        self.storage.close()
    }

    pub fn size(&self) -> u64 {
        self.storage.size()
    }

    /// True once the buffered bytes reach `threshold` and the table should be handed off
    /// for flushing.
    pub fn should_flush(&self, threshold: u64) -> bool {
        self.size() >= threshold
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
