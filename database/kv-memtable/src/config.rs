//! Options fixed when a skiplist is built.
//!
//! `max_level` sizes the head node's link array up front, so it is capped at
//! [`MAX_LEVEL_LIMIT`]. 64 levels already covers far more entries than a memtable holds
//! before it is flushed.

use crate::StorageError;

/// Levels a list gets when nothing else is asked for: 48, indexed `0..=47`.
pub const DEFAULT_MAX_LEVEL: usize = 47;

/// Highest `max_level` a list may be built with.
pub const MAX_LEVEL_LIMIT: usize = 63;

/// Construction time knobs for a [`crate::SkipList`]. Fixed once the list exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkipListOptions {
    pub max_level: usize,
    /// Seed for the level randomizer. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl SkipListOptions {
    pub fn new() -> SkipListOptions {
        SkipListOptions {
            max_level: DEFAULT_MAX_LEVEL,
            seed: None,
        }
    }

    pub fn with_max_level(mut self, max_level: usize) -> SkipListOptions {
        self.max_level = max_level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> SkipListOptions {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        if self.max_level > MAX_LEVEL_LIMIT {
            return Err(StorageError::InvalidMaxLevel {
                level: self.max_level,
                limit: MAX_LEVEL_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for SkipListOptions {
    fn default() -> Self {
        Self::new()
    }
}
