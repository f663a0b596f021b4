//! Immutable case-insensitive prefix index over column values.
//!
//! Built once per attribute-values cache entry and replaced wholesale on
//! refresh, so lookups need no synchronization. A sorted map keyed by the
//! lowercased value gives sub-linear prefix scans; the stored value keeps its
//! original case for display.

use std::collections::BTreeMap;

/// Case-insensitive mapping from lowercased values to their original form,
/// supporting bounded prefix queries.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    entries: BTreeMap<String, String>,
}

impl PrefixIndex {
    /// Builds an index from raw values. Values colliding on their lowercase
    /// form keep one representative, last write wins.
    #[must_use]
    pub fn build(values: impl IntoIterator<Item = String>) -> Self {
        let mut entries = BTreeMap::new();
        for value in values {
            entries.insert(value.to_lowercase(), value);
        }
        Self { entries }
    }

    /// Returns at most `limit` original-case values whose lowercase form
    /// starts with `filter` (matched case-insensitively), in index order.
    ///
    /// An empty filter browses the index from the start. The limit is applied
    /// while scanning, so no more than `limit` results are ever materialized.
    #[must_use]
    pub fn prefix_search(&self, filter: &str, limit: usize) -> Vec<String> {
        if filter.is_empty() {
            return self.entries.values().take(limit).cloned().collect();
        }

        let needle = filter.to_lowercase();
        self.entries
            .range(needle.clone()..)
            .take_while(|(key, _)| key.starts_with(&needle))
            .take(limit)
            .map(|(_, value)| value.clone())
            .collect()
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
