//! Error types for the discovery layer.

use crate::{source::SourceError, types::DataType};
use thiserror::Error;

/// User-input validation failures from `list_attribute_values`.
///
/// Collected into a list so multiple simultaneous violations are reported
/// together; these never abort the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The attribute's type cannot be distinct-queried.
    #[error("attribute data type {0:?} cannot be distinct-queried")]
    InvalidAttributeDataType(DataType),

    /// Too many distinct values to enumerate safely.
    #[error("attribute cardinality {0} exceeds the enumerable limit")]
    HighCardinalityAttribute(u64),

    /// Cache-backed lookup given a filter shorter than the configured minimum.
    #[error("filter must be at least {0} characters long")]
    InvalidAttributeFilterLength(usize),
}

/// Failures on the synchronous warm-up paths.
///
/// Source failures are not swallowed here; whoever awaits warm-up decides
/// whether to proceed serving with partial caches.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("source query failed during warm-up: {0}")]
    Source(#[from] SourceError),
}
