//! Derivation of entity and attribute records from introspected tables.
//!
//! Shared by the warm-up phases and the background refresh paths so both
//! produce identical records from the same source truth.

use crate::{
    source::{map_source_type, SourceError, SourceQueryExecutor, TableDescriptor},
    types::{derive_display_name, Attribute, Entity, KeyType},
};

/// Derives the attribute list for one introspected table.
///
/// Queryable columns start at cardinality zero (counted later by the
/// cardinality warm-up phase); non-queryable columns stay uncounted forever.
pub(crate) fn derive_attributes(table: &TableDescriptor) -> Vec<Attribute> {
    table
        .columns
        .iter()
        .map(|column| {
            let data_type = map_source_type(&column.source_type);
            Attribute {
                name: column.name.clone(),
                display_name: derive_display_name(&column.name),
                data_type,
                cardinality: data_type.is_queryable().then_some(0),
                key_type: if table.is_unique_column(&column.name) {
                    KeyType::UniqueKey
                } else {
                    KeyType::NonKey
                },
                entity: table.name.clone(),
            }
        })
        .collect()
}

/// Fetches the entity list for one schema: table names plus row counts.
pub(crate) async fn fetch_entities(
    executor: &dyn SourceQueryExecutor,
    schema: &str,
) -> Result<Vec<Entity>, SourceError> {
    let tables = executor.list_tables(schema).await?;
    let mut entities = Vec::with_capacity(tables.len());
    for table in &tables {
        entities.push(Entity {
            name: table.name.clone(),
            display_name: derive_display_name(&table.name),
            row_count: executor.count_rows(schema, &table.name).await?,
        });
    }
    Ok(entities)
}
