//! Boundary to the relational source holding the indexed chain data.
//!
//! The discovery layer never generates SQL or touches a driver; it consumes
//! the [`SourceQueryExecutor`] trait, which exposes exactly the introspection
//! and distinct-query primitives the cache needs. Implementations live with
//! the database integration, mocks live with the tests.

use crate::types::DataType;
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a source query executor.
///
/// The executor's own timeout/retry policy is opaque to this crate; whatever
/// failure it reports is carried through as-is.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("schema {0} not found")]
    UnknownSchema(String),

    #[error("source query failed: {0}")]
    Query(String),
}

/// One table as reported by schema introspection, with everything needed to
/// derive entity and attribute records in a single batched fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
    pub primary_keys: Vec<String>,
}

impl TableDescriptor {
    /// Whether the column participates in the primary key or a unique index.
    #[must_use]
    pub fn is_unique_column(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|pk| pk == column)
            || self
                .indexes
                .iter()
                .any(|index| index.unique && index.columns.iter().any(|c| c == column))
    }
}

/// One column of an introspected table, with the raw source type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub source_type: String,
}

/// One index of an introspected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Async query primitives against the source database.
///
/// All methods are fallible and may suspend; nothing in the cache layer calls
/// them on a request's critical path except the live (uncached) distinct-value
/// lookup.
#[async_trait]
pub trait SourceQueryExecutor: Send + Sync {
    /// Lists all tables in a schema with columns, indexes, and primary keys.
    async fn list_tables(&self, schema: &str) -> Result<Vec<TableDescriptor>, SourceError>;

    /// Counts the rows of a table.
    async fn count_rows(&self, schema: &str, table: &str) -> Result<u64, SourceError>;

    /// Returns the distinct values of a column.
    async fn select_distinct(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<Vec<String>, SourceError>;

    /// Returns the distinct values of a column matching a pattern.
    async fn select_distinct_filtered(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        pattern: &str,
    ) -> Result<Vec<String>, SourceError>;

    /// Counts the distinct values of a column.
    async fn count_distinct(&self, schema: &str, table: &str, column: &str)
        -> Result<u64, SourceError>;
}

/// Maps a raw source column type name to a [`DataType`].
///
/// Matching is case-insensitive on the leading type word, so parameterized
/// forms like `varchar(64)` or `numeric(38, 0)` resolve the same as their bare
/// names. Unrecognized types fall back to [`DataType::String`].
#[must_use]
pub fn map_source_type(source_type: &str) -> DataType {
    let normalized = source_type.trim().to_ascii_lowercase();
    let base = normalized.split(['(', ' ']).next().unwrap_or("");

    match base {
        "int" | "int2" | "int4" | "integer" | "smallint" | "mediumint" => DataType::Int,
        "bigint" | "int8" | "uint64" | "uint256" => DataType::LargeInt,
        "decimal" | "numeric" | "real" | "double" | "float" | "float4" | "float8" => {
            DataType::Decimal
        }
        "date" => DataType::Date,
        "timestamp" | "timestamptz" | "datetime" => DataType::DateTime,
        "bool" | "boolean" => DataType::Boolean,
        _ => DataType::String,
    }
}
