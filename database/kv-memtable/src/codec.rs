//! Records stored in the memtable.
//!
//! The on-disk encoding lives elsewhere; here an [`Entry`] is just a key, a value and
//! an expiry stamp.

use bytes::Bytes;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Bytes,
    pub value: Bytes,
    /// Unix timestamp in seconds, 0 means the entry never expires.
    pub expires_at: u64,
}

impl Entry {
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Entry {
        Entry {
            key: key.into(),
            value: value.into(),
            expires_at: 0,
        }
    }

    pub fn with_ttl(mut self, expires_at: u64) -> Entry {
        self.expires_at = expires_at;
        self
    }

    /// Bytes this entry contributes to a memtable's size.
    pub fn estimate_size(&self) -> u64 {
        (self.key.len() + self.value.len()) as u64
    }
}
