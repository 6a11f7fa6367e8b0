//! A probabilistic skiplist keeping memtable entries sorted by key.
//!
//! Nodes live in an index arena with the head sentinel at `HEAD`. Every node owns
//! one forward link per level it was assigned; the head owns `max_level + 1` of them.
//! A single reader/writer lock guards the whole arena: inserts hold it exclusively for
//! both the search and the splice, lookups share it.
//!
//! ```text
//! level 2:  HEAD ----------------> banana --------------> NULL
//! level 1:  HEAD ----> apple ----> banana --------------> NULL
//! level 0:  HEAD ----> apple ----> banana ----> grape --> NULL
//! ```

use std::{cmp::Ordering, fmt::Debug, mem::replace};

use anyhow::Result;
use parking_lot::RwLock;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, trace};

use crate::{calc_score, compare, Entry, SkipListOptions, Storage, StorageError};

type Index = usize;

const NULL: Index = usize::MAX;
const HEAD: Index = 0;
const OFFSET: Index = 1;

#[derive(Debug)]
struct Node {
    /// `links[i]` is the next node on level `i`.
    links: Vec<Index>,
    entry: Option<Entry>,
    score: f64,
}

impl Node {
    fn key(&self) -> &[u8] {
        self.entry.as_ref().map(|e| &e.key[..]).unwrap_or_default()
    }
}

#[derive(Debug)]
struct Nodes {
    head: Node,
    data_nodes: Vec<Node>,
}

impl Nodes {
    fn new(max_level: usize) -> Self {
        Nodes {
            head: Node {
                links: vec![NULL; max_level + 1],
                entry: None,
                score: 0.0,
            },
            data_nodes: vec![],
        }
    }

    fn new_node(&mut self, entry: Entry, score: f64, level: usize) -> Index {
        let node = Node {
            links: vec![NULL; level + 1],
            entry: Some(entry),
            score,
        };
        self.data_nodes.push(node);
        self.data_nodes.len() - 1 + OFFSET
    }

    fn len(&self) -> usize {
        self.data_nodes.len()
    }
}

impl std::ops::Index<usize> for Nodes {
    type Output = Node;

    fn index(&self, index: usize) -> &Self::Output {
        match index {
            HEAD => &self.head,
            _ => &self.data_nodes[index - OFFSET],
        }
    }
}

impl std::ops::IndexMut<usize> for Nodes {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match index {
            HEAD => &mut self.head,
            _ => &mut self.data_nodes[index - OFFSET],
        }
    }
}

/// Everything behind the lock. The rng is in here so that only the writer holding the
/// lock ever draws from it.
struct Inner {
    nodes: Nodes,
    rng: StdRng,
    size: u64,
}

impl Inner {
    /// Walks from the head, top level down. Returns the node holding `key` as soon as
    /// one is met. Otherwise fills `prevs[i]` with the last node on level `i` that
    /// sorts before `key` and returns `None`.
    fn seek(
        &self,
        max_level: usize,
        score: f64,
        key: &[u8],
        mut prevs: Option<&mut [Index]>,
    ) -> Option<Index> {
        let mut prev = HEAD;
        for level in (0..=max_level).rev() {
            let mut next = self.nodes[prev].links[level];
            while next != NULL {
                let node = &self.nodes[next];
                match compare(score, key, node.score, node.key()) {
                    Ordering::Greater => {
                        prev = next;
                        next = node.links[level];
                    }
                    Ordering::Equal => return Some(next),
                    Ordering::Less => break,
                }
            }
            if let Some(prevs) = prevs.as_deref_mut() {
                prevs[level] = prev;
            }
        }
        None
    }

    /// Coin flips until the first tail. Level `i` comes out with probability
    /// `2^-(i+1)`, and `max_level` soaks up whatever is left.
    fn rand_level(&mut self, max_level: usize) -> usize {
        for level in 0..max_level {
            if self.rng.gen_bool(0.5) {
                return level;
            }
        }
        max_level
    }
}

/// Sorted, internally locked index of memtable entries, shared by reference across threads.
pub struct SkipList {
    max_level: usize,
    inner: RwLock<Inner>,
}

impl SkipList {
    /// An empty list with the default 48 levels and an entropy seeded level randomizer.
    pub fn new() -> SkipList {
        Self::build(SkipListOptions::default())
    }

    pub fn with_options(options: SkipListOptions) -> Result<SkipList, StorageError> {
        options.validate()?;
        Ok(Self::build(options))
    }

    fn build(options: SkipListOptions) -> SkipList {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(
            max_level = options.max_level,
            seeded = options.seed.is_some(),
            "new skiplist"
        );
        SkipList {
            max_level: options.max_level,
            inner: RwLock::new(Inner {
                nodes: Nodes::new(options.max_level),
                rng,
                size: 0,
            }),
        }
    }

    /// Adds `entry`, or overwrites the value of the entry already stored under its key.
    /// An update keeps the stored key and expiry and allocates nothing.
    pub fn insert(&self, entry: Entry) {
        let score = calc_score(&entry.key);
        let mut inner = self.inner.write();

        let mut prevs = vec![HEAD; self.max_level + 1];
        let found = inner.seek(self.max_level, score, &entry.key, Some(prevs.as_mut_slice()));
        if let Some(found) = found {
            let Inner { nodes, size, .. } = &mut *inner;
            if let Some(stored) = nodes[found].entry.as_mut() {
                trace!(key = ?entry.key, "update in place");
                *size -= stored.value.len() as u64;
                *size += entry.value.len() as u64;
                stored.value = entry.value;
            }
            return;
        }

        let level = inner.rand_level(self.max_level);
        let added = entry.estimate_size();
        trace!(key = ?entry.key, level, "splice new node");

        let node = inner.nodes.new_node(entry, score, level);
        for (i, prev) in prevs.iter().take(level + 1).enumerate() {
            let next = replace(&mut inner.nodes[*prev].links[i], node);
            inner.nodes[node].links[i] = next;
        }
        inner.size += added;
    }

    /// Looks up `key`. The returned entry is a cheap clone; its buffers are shared with
    /// the stored one.
    pub fn search(&self, key: &[u8]) -> Option<Entry> {
        let score = calc_score(key);
        let inner = self.inner.read();
        inner
            .seek(self.max_level, score, key, None)
            .and_then(|found| inner.nodes[found].entry.clone())
    }

    /// Nothing to release, the list is dropped by its owner.
    pub fn close(&self) -> Result<()> {
        debug!(entries = self.len(), size = self.size(), "skiplist closed");
        Ok(())
    }

    /// Sum of key and value bytes currently stored.
    pub fn size(&self) -> u64 {
        self.inner.read().size
    }

    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SkipList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SkipList")
            .field("max_level", &self.max_level)
            .field("len", &inner.nodes.len())
            .field("size", &inner.size)
            .finish()
    }
}

impl Storage for SkipList {
    fn put(&self, entry: Entry) -> Result<()> {
        self.insert(entry);
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(self.search(key))
    }

    fn close(&self) -> Result<()> {
        SkipList::close(self)
    }

    fn size(&self) -> u64 {
        SkipList::size(self)
    }
}

#[cfg(test)]
use bytes::Bytes;

#[cfg(test)]
impl SkipList {
    /// Keys on `level`, in link order.
    fn level_keys(&self, level: usize) -> Vec<Bytes> {
        let inner = self.inner.read();
        let mut keys = vec![];
        let mut next = inner.nodes[HEAD].links[level];
        while next != NULL {
            let node = &inner.nodes[next];
            keys.push(Bytes::copy_from_slice(node.key()));
            next = node.links[level];
        }
        keys
    }

    /// `(key, number of links)` for every data node.
    fn heights(&self) -> Vec<(Bytes, usize)> {
        let inner = self.inner.read();
        inner
            .nodes
            .data_nodes
            .iter()
            .map(|n| (Bytes::copy_from_slice(n.key()), n.links.len()))
            .collect()
    }

    fn head_links(&self) -> usize {
        self.inner.read().nodes[HEAD].links.len()
    }

    fn draw_level(&self) -> usize {
        self.inner.write().rand_level(self.max_level)
    }
}
