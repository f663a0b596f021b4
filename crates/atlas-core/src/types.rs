//! Domain model shared by the cache, discovery, and source layers.
//!
//! Platforms group networks; networks point at a source schema; entities are
//! the logical tables of indexed chain data; attributes are their columns with
//! a declared type, key role, and (once computed) a distinct-value cardinality.

use serde::{Deserialize, Serialize};

/// Logical data type of an attribute, mapped from the source column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Int,
    LargeInt,
    Decimal,
    Date,
    DateTime,
    Boolean,
}

impl DataType {
    /// Whether distinct values of this type may be enumerated or counted.
    ///
    /// Numeric and temporal columns are never distinct-queried: their value
    /// sets grow with the chain and enumerating them is never useful for
    /// filtering.
    #[must_use]
    pub fn is_queryable(self) -> bool {
        matches!(self, Self::String | Self::Boolean)
    }
}

/// Key role of an attribute within its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    /// Member of the primary key or a unique index.
    UniqueKey,
    NonKey,
}

/// A supported blockchain implementation family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub display_name: String,
}

/// A named deployment of a platform, bound to one source schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub display_name: String,
    /// Name of the owning platform.
    pub platform: String,
    /// Schema path used for source queries against this deployment.
    pub path: String,
}

/// One logical table of indexed chain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub display_name: String,
    pub row_count: u64,
}

/// A column of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub display_name: String,
    pub data_type: DataType,
    /// Count of distinct values, if known. `None` until the cardinality
    /// warm-up phase has computed it (or when the type is not queryable).
    pub cardinality: Option<u64>,
    pub key_type: KeyType,
    /// Name of the owning entity.
    pub entity: String,
}

/// Addresses one network of a platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkPath {
    pub platform: String,
    pub network: String,
}

/// Addresses one entity within a platform/network pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityPath {
    pub platform: String,
    pub network: String,
    pub entity: String,
}

/// Addresses one attribute of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    pub platform: String,
    pub network: String,
    pub entity: String,
    pub column: String,
}

/// Derives a human-readable display name from a source identifier:
/// first letter capitalized, underscores replaced with spaces.
#[must_use]
pub fn derive_display_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
