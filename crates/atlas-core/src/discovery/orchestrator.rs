//! The metadata discovery orchestrator.
//!
//! Implements the refresh-ahead protocol against the store: reads are
//! synchronous in-memory snapshots, and an expired entry is served as-is
//! while a fire-and-forget task recomputes it for future readers. Refreshes
//! are not deduplicated per key; concurrent stale reads may each spawn a
//! redundant refresh, which is acceptable because refreshes are idempotent
//! re-derivations from source truth.

use crate::{
    cache::{
        store::{AttributeValuesKey, AttributesKey, EntitiesKey},
        CachingStatus, CardinalityEngine, MetadataStore, LOW_CARDINALITY_THRESHOLD,
    },
    config::DiscoveryConfig,
    discovery::{background, errors::ValidationError},
    source::{SourceError, SourceQueryExecutor},
    types::{Attribute, AttributePath, Entity, EntityPath, NetworkPath},
};
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{debug, trace, warn};

/// Top-level discovery component owning the store, the source executor, and
/// the cardinality engine.
///
/// # Cloning
///
/// Implements `Clone` with cheap `Arc` reference counting; clones share the
/// same store and executor and are safe to pass across task boundaries.
#[derive(Clone)]
pub struct MetadataDiscovery {
    pub(crate) store: Arc<MetadataStore>,
    pub(crate) executor: Arc<dyn SourceQueryExecutor>,
    pub(crate) config: Arc<DiscoveryConfig>,
    pub(crate) cardinality: CardinalityEngine,
    pub(crate) cache_ttl: Duration,
}

impl MetadataDiscovery {
    #[must_use]
    pub fn new(
        config: Arc<DiscoveryConfig>,
        store: Arc<MetadataStore>,
        executor: Arc<dyn SourceQueryExecutor>,
    ) -> Self {
        let cardinality = CardinalityEngine::new(config.high_cardinality_limit);
        let cache_ttl = config.cache_ttl();
        Self { store, executor, config, cardinality, cache_ttl }
    }

    /// Shared store handle, for admin/diagnostic surfaces.
    #[must_use]
    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// Returns the entities of a platform/network pair.
    ///
    /// Absent keys yield an empty list. An expired entry is returned
    /// immediately while a background refresh overwrites it for later reads.
    #[must_use]
    pub fn get_entities(&self, path: &NetworkPath) -> Vec<Entity> {
        let key =
            EntitiesKey { platform: path.platform.clone(), network: path.network.clone() };
        let Some(entry) = self.store.entities.get(&key) else {
            debug!(platform = %path.platform, network = %path.network, "entities cache miss");
            return Vec::new();
        };

        if entry.is_expired(self.cache_ttl) {
            trace!(platform = %path.platform, network = %path.network, "serving stale entities");
            if let Some(schema) = self.schema_for(&path.platform, &path.network) {
                self.spawn_refresh(
                    "entities",
                    background::refresh_entities(
                        Arc::clone(&self.store),
                        Arc::clone(&self.executor),
                        key,
                        schema,
                    ),
                );
            }
        }

        entry.value.as_ref().clone()
    }

    /// Returns the attributes of an entity, or `None` when nothing is cached.
    ///
    /// Until the cardinality warm-up phase has finished, counts have not been
    /// computed reliably for this cycle, so every attribute is served with
    /// `cardinality` absent even when a stale count is cached. Once finished,
    /// expired entries are served stale while a background refresh re-derives
    /// the list and re-runs the cardinality engine.
    #[must_use]
    pub fn get_table_attributes(&self, path: &EntityPath) -> Option<Vec<Attribute>> {
        let key = AttributesKey { platform: path.platform.clone(), entity: path.entity.clone() };
        let entry = self.store.attributes.get(&key)?;

        if self.store.status() != CachingStatus::Finished {
            return Some(
                entry
                    .value
                    .iter()
                    .cloned()
                    .map(|mut attribute| {
                        attribute.cardinality = None;
                        attribute
                    })
                    .collect(),
            );
        }

        if entry.is_expired(self.cache_ttl) {
            trace!(platform = %path.platform, entity = %path.entity, "serving stale attributes");
            if let Some(schema) = self.schema_for(&path.platform, &path.network) {
                self.spawn_refresh(
                    "attributes",
                    background::refresh_attributes(
                        Arc::clone(&self.store),
                        Arc::clone(&self.executor),
                        Arc::clone(&self.config),
                        self.cardinality,
                        key,
                        schema,
                    ),
                );
            }
        }

        Some(entry.value.as_ref().clone())
    }

    /// Pure read of the attributes cache: no refresh, no status gating.
    ///
    /// Used internally during warm-up and value validation to avoid refresh
    /// storms while entries are deliberately being rewritten.
    #[must_use]
    pub fn get_table_attributes_uncached(&self, path: &EntityPath) -> Option<Vec<Attribute>> {
        let key = AttributesKey { platform: path.platform.clone(), entity: path.entity.clone() };
        self.store.attributes.get(&key).map(|entry| entry.value.as_ref().clone())
    }

    /// Lists distinct values of an attribute, for typeahead-style filtering.
    ///
    /// Cache-backed attributes are served from their prefix index (stale
    /// indexes are rebuilt in the background); everything else is validated
    /// against type and cardinality and then queried live, uncached.
    /// Violations are collected into one list, never short-circuited.
    ///
    /// # Errors
    ///
    /// Returns the collected [`ValidationError`]s for invalid requests.
    pub async fn list_attribute_values(
        &self,
        path: &AttributePath,
        filter: Option<&str>,
    ) -> Result<Vec<String>, Vec<ValidationError>> {
        let cache_config = self.config.attribute_cache_config(path).filter(|c| c.cached);

        if let Some(cache_config) = cache_config {
            let filter = filter.unwrap_or("");
            if filter.chars().count() < cache_config.min_match_length {
                return Err(vec![ValidationError::InvalidAttributeFilterLength(
                    cache_config.min_match_length,
                )]);
            }
            return Ok(self.cached_values(path, filter, cache_config.max_result_length));
        }

        let entity_path = EntityPath {
            platform: path.platform.clone(),
            network: path.network.clone(),
            entity: path.entity.clone(),
        };
        let Some(attribute) = self
            .get_table_attributes_uncached(&entity_path)
            .and_then(|attributes| attributes.into_iter().find(|a| a.name == path.column))
        else {
            debug!(
                platform = %path.platform,
                entity = %path.entity,
                column = %path.column,
                "attribute unknown; returning no values"
            );
            return Ok(Vec::new());
        };

        let mut errors = Vec::new();
        if !attribute.data_type.is_queryable() {
            errors.push(ValidationError::InvalidAttributeDataType(attribute.data_type));
        }
        let cardinality = attribute.cardinality.unwrap_or(0);
        if cardinality >= LOW_CARDINALITY_THRESHOLD {
            errors.push(ValidationError::HighCardinalityAttribute(cardinality));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(self.live_values(path, filter).await)
    }

    /// Serves a cache-backed lookup from the prefix index, triggering a
    /// rebuild when the index has gone stale.
    fn cached_values(&self, path: &AttributePath, filter: &str, limit: usize) -> Vec<String> {
        let key = AttributeValuesKey {
            platform: path.platform.clone(),
            entity: path.entity.clone(),
            column: path.column.clone(),
        };
        let Some(entry) = self.store.attribute_values.get(&key) else {
            debug!(
                platform = %path.platform,
                entity = %path.entity,
                column = %path.column,
                "value index not built; returning no values"
            );
            return Vec::new();
        };

        if entry.is_expired(self.cache_ttl) {
            trace!(entity = %path.entity, column = %path.column, "serving stale value index");
            if let Some(schema) = self.schema_for(&path.platform, &path.network) {
                self.spawn_refresh(
                    "attribute values",
                    background::refresh_values(
                        Arc::clone(&self.store),
                        Arc::clone(&self.executor),
                        key,
                        schema,
                    ),
                );
            }
        }

        entry.value.prefix_search(filter, limit)
    }

    /// Runs a live distinct query for a validated uncached attribute.
    ///
    /// Live failures degrade to an empty result rather than failing the read;
    /// validation has already passed and the source owns its own retry policy.
    async fn live_values(&self, path: &AttributePath, filter: Option<&str>) -> Vec<String> {
        let Some(schema) = self.schema_for(&path.platform, &path.network) else {
            return Vec::new();
        };

        let result = match filter.filter(|f| !f.is_empty()) {
            Some(pattern) => {
                self.executor
                    .select_distinct_filtered(&schema, &path.entity, &path.column, pattern)
                    .await
            }
            None => self.executor.select_distinct(&schema, &path.entity, &path.column).await,
        };

        match result {
            Ok(values) => values,
            Err(error) => {
                warn!(
                    entity = %path.entity,
                    column = %path.column,
                    error = %error,
                    "live distinct query failed"
                );
                Vec::new()
            }
        }
    }

    /// Resolves the source schema for a platform/network pair, logging once
    /// per lookup when the pair is not configured.
    fn schema_for(&self, platform: &str, network: &str) -> Option<String> {
        let schema = self.config.schema_path(platform, network).map(str::to_owned);
        if schema.is_none() {
            warn!(platform, network, "no schema path configured; refresh skipped");
        }
        schema
    }

    /// Spawns a fire-and-forget refresh task. The triggering read never waits
    /// on it; failures are terminal for that single attempt and leave the
    /// previous entry in place.
    fn spawn_refresh(
        &self,
        what: &'static str,
        task: impl Future<Output = Result<(), SourceError>> + Send + 'static,
    ) {
        tokio::spawn(async move {
            if let Err(error) = task.await {
                warn!(what, error = %error, "background refresh failed");
            }
        });
    }
}
