//! Refresh task bodies executed off the read path.
//!
//! All three follow the same shape: re-derive the value from source truth,
//! overwrite the cache entry on success. On failure the previous entry stays
//! in place and the attempt is logged; refreshes carry no timeout of their
//! own, so a hung source query simply leaves the entry stale. Writes to one
//! key are last-writer-wins by completion time, which is safe because every
//! refresh is an idempotent re-derivation.

use crate::{
    cache::{
        store::{AttributeValuesKey, AttributesKey, EntitiesKey},
        CardinalityEngine, MetadataStore, PrefixIndex,
    },
    config::DiscoveryConfig,
    discovery::derive,
    source::{SourceError, SourceQueryExecutor},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Re-fetches the entity list for one platform/network pair.
pub(crate) async fn refresh_entities(
    store: Arc<MetadataStore>,
    executor: Arc<dyn SourceQueryExecutor>,
    key: EntitiesKey,
    schema: String,
) -> Result<(), SourceError> {
    let entities = derive::fetch_entities(executor.as_ref(), &schema).await?;
    debug!(
        platform = %key.platform,
        network = %key.network,
        entities = entities.len(),
        "entities refreshed"
    );
    store.entities.put(key, entities);
    Ok(())
}

/// Re-derives the attribute list for one entity, carrying prior cardinalities
/// forward as the known values the cardinality engine compares against.
pub(crate) async fn refresh_attributes(
    store: Arc<MetadataStore>,
    executor: Arc<dyn SourceQueryExecutor>,
    config: Arc<DiscoveryConfig>,
    engine: CardinalityEngine,
    key: AttributesKey,
    schema: String,
) -> Result<(), SourceError> {
    let tables = executor.list_tables(&schema).await?;
    let Some(table) = tables.iter().find(|table| table.name == key.entity) else {
        warn!(
            platform = %key.platform,
            entity = %key.entity,
            "entity no longer present in source; keeping stale attributes"
        );
        return Ok(());
    };

    let prior = store.attributes.get(&key);
    let mut attributes = derive::derive_attributes(table);
    for attribute in &mut attributes {
        if let Some(previous) = prior
            .as_ref()
            .and_then(|entry| entry.value.iter().find(|a| a.name == attribute.name))
        {
            attribute.cardinality = previous.cardinality;
        }

        let hint = config.cardinality_hint(&key.platform, &key.entity, &attribute.name);
        engine.apply(executor.as_ref(), &schema, &key.entity, attribute, hint).await?;
    }

    debug!(
        platform = %key.platform,
        entity = %key.entity,
        attributes = attributes.len(),
        "attributes refreshed"
    );
    store.attributes.put(key, attributes);
    Ok(())
}

/// Rebuilds the prefix index for one cached attribute from a fresh distinct
/// query.
pub(crate) async fn refresh_values(
    store: Arc<MetadataStore>,
    executor: Arc<dyn SourceQueryExecutor>,
    key: AttributeValuesKey,
    schema: String,
) -> Result<(), SourceError> {
    let values = executor.select_distinct(&schema, &key.entity, &key.column).await?;
    let index = PrefixIndex::build(values);
    debug!(
        platform = %key.platform,
        entity = %key.entity,
        column = %key.column,
        indexed = index.len(),
        "prefix index rebuilt"
    );
    store.attribute_values.put(key, index);
    Ok(())
}
