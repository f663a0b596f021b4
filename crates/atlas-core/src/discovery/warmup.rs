//! Two-phase bulk warm-up.
//!
//! Phase one ([`MetadataDiscovery::init`]) introspects every configured
//! platform/network pair in one batched fetch per pair and populates all
//! three cache categories, leaving the global status untouched so name
//! discovery is available immediately. Phase two
//! ([`MetadataDiscovery::init_attributes_cache`]) is the slow part: it walks
//! the cached entities and runs the cardinality engine over every column,
//! flipping the status `InProgress -> Finished` around the whole pass.
//!
//! The phases are deliberately decoupled so a caller can await either
//! independently; source failures propagate to whoever awaits, who decides
//! whether to serve with partial caches.

use crate::{
    cache::{
        store::{AttributeValuesKey, AttributesKey, EntitiesKey},
        CachingStatus, PrefixIndex,
    },
    discovery::{derive, errors::DiscoveryError, MetadataDiscovery},
    types::{Entity, Network, Platform},
};
use tracing::{debug, info, warn};

impl MetadataDiscovery {
    /// Phase one: discover entities, attributes, and configured value indexes
    /// for every pair, then bulk-fill each category. Does not touch the
    /// caching status.
    ///
    /// Re-running with unchanged source data produces the same values
    /// (timestamps aside).
    ///
    /// # Errors
    ///
    /// Propagates the first source failure; nothing is filled in that case.
    pub async fn init(&self, pairs: &[(Platform, Network)]) -> Result<(), DiscoveryError> {
        let mut entity_lists = Vec::with_capacity(pairs.len());
        let mut attribute_lists = Vec::new();
        let mut value_indexes = Vec::new();

        for (platform, network) in pairs {
            let schema = network.path.as_str();
            let tables = self.executor.list_tables(schema).await?;
            info!(
                platform = %platform.name,
                network = %network.name,
                tables = tables.len(),
                "discovered tables"
            );

            let mut entities = Vec::with_capacity(tables.len());
            for table in &tables {
                entities.push(Entity {
                    name: table.name.clone(),
                    display_name: crate::types::derive_display_name(&table.name),
                    row_count: self.executor.count_rows(schema, &table.name).await?,
                });

                attribute_lists.push((
                    AttributesKey {
                        platform: platform.name.clone(),
                        entity: table.name.clone(),
                    },
                    derive::derive_attributes(table),
                ));

                for column in &table.columns {
                    if !self.config.is_value_cached(&platform.name, &table.name, &column.name) {
                        continue;
                    }
                    let values =
                        self.executor.select_distinct(schema, &table.name, &column.name).await?;
                    debug!(
                        entity = %table.name,
                        column = %column.name,
                        values = values.len(),
                        "built value index"
                    );
                    value_indexes.push((
                        AttributeValuesKey {
                            platform: platform.name.clone(),
                            entity: table.name.clone(),
                            column: column.name.clone(),
                        },
                        PrefixIndex::build(values),
                    ));
                }
            }

            entity_lists.push((
                EntitiesKey { platform: platform.name.clone(), network: network.name.clone() },
                entities,
            ));
        }

        self.store.entities.fill(entity_lists);
        self.store.attributes.fill(attribute_lists);
        self.store.attribute_values.fill(value_indexes);

        let stats = self.store.stats();
        info!(
            entity_lists = stats.entity_lists,
            attribute_lists = stats.attribute_lists,
            value_indexes = stats.value_indexes,
            "warm-up phase one complete"
        );
        Ok(())
    }

    /// Phase two: compute cardinalities for every cached entity's attributes,
    /// batched per entity, bracketed by the `InProgress -> Finished` status
    /// transition.
    ///
    /// # Errors
    ///
    /// Propagates the first source failure; the status then stays
    /// `InProgress` so cardinality figures remain withheld from readers.
    pub async fn init_attributes_cache(
        &self,
        pairs: &[(Platform, Network)],
    ) -> Result<(), DiscoveryError> {
        self.store.set_status(CachingStatus::InProgress);
        info!(pairs = pairs.len(), "cardinality warm-up started");

        for (platform, network) in pairs {
            let schema = network.path.as_str();
            let entities_key =
                EntitiesKey { platform: platform.name.clone(), network: network.name.clone() };
            let Some(entities) = self.store.entities.get(&entities_key) else {
                warn!(
                    platform = %platform.name,
                    network = %network.name,
                    "no cached entities for pair; skipping"
                );
                continue;
            };

            let attribute_keys: Vec<AttributesKey> = entities
                .value
                .iter()
                .map(|entity| AttributesKey {
                    platform: platform.name.clone(),
                    entity: entity.name.clone(),
                })
                .collect();

            for (key, entry) in self.store.attributes.get_all_by_keys(&attribute_keys) {
                let mut attributes = entry.value.as_ref().clone();
                for attribute in &mut attributes {
                    let hint = self.config.cardinality_hint(
                        &key.platform,
                        &key.entity,
                        &attribute.name,
                    );
                    self.cardinality
                        .apply(self.executor.as_ref(), schema, &key.entity, attribute, hint)
                        .await?;
                }
                debug!(entity = %key.entity, attributes = attributes.len(), "cardinalities computed");
                self.store.attributes.put(key, attributes);
            }
        }

        self.store.set_status(CachingStatus::Finished);
        info!("cardinality warm-up finished");
        Ok(())
    }
}
