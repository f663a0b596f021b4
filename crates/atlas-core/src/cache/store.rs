//! Process-wide concurrent store for the three metadata cache categories.
//!
//! The store knows nothing about how entries are computed; it hands out
//! snapshots and stamps writes with the monotonic clock. Categories are
//! `DashMap`-backed so many readers and occasional writers never observe a
//! torn entry, and the global warm-up status is a single atomic cell.

use crate::{
    cache::prefix_index::PrefixIndex,
    types::{Attribute, Entity},
};
use ahash::RandomState;
use dashmap::DashMap;
use std::{
    hash::Hash,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::Instant;

/// Global warm-up state gating whether cardinality figures are trustworthy.
///
/// Written twice per warm-up cycle, read on every attribute lookup; a single
/// atomic cell, not a lock-protected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachingStatus {
    NotStarted,
    InProgress,
    Finished,
}

impl CachingStatus {
    fn as_u8(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Finished => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::InProgress,
            2 => Self::Finished,
            _ => Self::NotStarted,
        }
    }
}

/// Key of the entities category: one entry per platform/network pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntitiesKey {
    pub platform: String,
    pub network: String,
}

/// Key of the attributes category: one entry per platform/entity pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributesKey {
    pub platform: String,
    pub entity: String,
}

/// Key of the attribute-values category: one prefix index per column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeValuesKey {
    pub platform: String,
    pub entity: String,
    pub column: String,
}

/// One cached value with the monotonic instant it was last recomputed from
/// source. Value and timestamp only ever change together.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub last_updated: Instant,
    pub value: Arc<T>,
}

// Manual impl: `T` need not be `Clone`, the snapshot shares the `Arc`.
impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self { last_updated: self.last_updated, value: Arc::clone(&self.value) }
    }
}

impl<T> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self { last_updated: Instant::now(), value: Arc::new(value) }
    }

    /// TTL rule: expired once `last_updated + ttl` lies in the past.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.last_updated + ttl < Instant::now()
    }
}

/// One cache category: a concurrent mapping from key to [`CacheEntry`].
///
/// All operations are non-blocking and per-entry atomic: a `put` is visible
/// to every subsequent `get` and never observed half-written.
pub struct CacheCategory<K, T> {
    entries: DashMap<K, CacheEntry<T>, RandomState>,
}

impl<K: Eq + Hash + Clone, T> CacheCategory<K, T> {
    fn new() -> Self {
        Self { entries: DashMap::with_hasher(RandomState::new()) }
    }

    /// Returns a snapshot of the entry, or `None` for unknown keys.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<CacheEntry<T>> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Writes a fresh entry stamped with the current instant.
    pub fn put(&self, key: K, value: T) {
        self.entries.insert(key, CacheEntry::new(value));
    }

    /// Writes many fresh entries, each stamped at insertion.
    pub fn put_all(&self, values: impl IntoIterator<Item = (K, T)>) {
        for (key, value) in values {
            self.put(key, value);
        }
    }

    /// Snapshots of the entries present for the given keys.
    #[must_use]
    pub fn get_all_by_keys(&self, keys: &[K]) -> Vec<(K, CacheEntry<T>)> {
        keys.iter()
            .filter_map(|key| self.get(key).map(|entry| (key.clone(), entry)))
            .collect()
    }

    /// Bulk initialization used during warm-up. Overwrites the given keys and
    /// leaves every other entry in place.
    pub fn fill(&self, values: impl IntoIterator<Item = (K, T)>) {
        self.put_all(values);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entry counts across all categories, for diagnostics and admin surfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entity_lists: usize,
    pub attribute_lists: usize,
    pub value_indexes: usize,
    /// Total values held across all prefix indexes.
    pub total_indexed_values: usize,
}

/// Sole owner of all cached metadata for the process lifetime.
///
/// Created empty at startup (`NotStarted`); callers only ever receive
/// snapshots, never mutable references into the store.
pub struct MetadataStore {
    pub entities: CacheCategory<EntitiesKey, Vec<Entity>>,
    pub attributes: CacheCategory<AttributesKey, Vec<Attribute>>,
    pub attribute_values: CacheCategory<AttributeValuesKey, PrefixIndex>,
    status: AtomicU8,
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: CacheCategory::new(),
            attributes: CacheCategory::new(),
            attribute_values: CacheCategory::new(),
            status: AtomicU8::new(CachingStatus::NotStarted.as_u8()),
        }
    }

    #[must_use]
    pub fn status(&self) -> CachingStatus {
        CachingStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn set_status(&self, status: CachingStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    /// Aggregates entry counts across all categories.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entity_lists: self.entities.len(),
            attribute_lists: self.attributes.len(),
            value_indexes: self.attribute_values.len(),
            total_indexed_values: self
                .attribute_values
                .entries
                .iter()
                .map(|entry| entry.value.len())
                .sum(),
        }
    }
}
