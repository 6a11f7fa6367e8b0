//! In-memory sorted index for a log-structured key value store.
//!
//! Writes land in a [`SkipList`] ordered by key, where they stay until the owning
//! [`MemTable`] grows large enough to be flushed.

use std::fmt::Debug;

use anyhow::Result;
use thiserror::Error;

pub mod codec;
pub use codec::Entry;

pub mod config;
pub use config::*;

pub mod memtable;
pub use memtable::MemTable;

pub mod score;
pub use score::{calc_score, compare};

pub mod skiplist;
pub use skiplist::SkipList;

/// The seam between the store and whatever keeps its in-memory records.
///
/// Implementations synchronise internally, so every method takes `&self`.
pub trait Storage {
    /// put here always succeeds for the skiplist, an existing key just gets the new value.
    fn put(&self, entry: Entry) -> Result<()>;
    fn get(&self, key: &[u8]) -> Result<Option<Entry>>;
    fn close(&self) -> Result<()>;
    fn size(&self) -> u64;
}

impl Debug for dyn Storage + Send + Sync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Storage {{ size: {} }}", self.size())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("max level {level} is above the supported limit of {limit}")]
    InvalidMaxLevel { level: usize, limit: usize },
}
