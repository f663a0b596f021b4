//! Cardinality-aware query elision.
//!
//! Distinct-count queries are the expensive part of attribute refresh, so the
//! engine decides per attribute whether one is worth issuing at all. The
//! decision is re-evaluated on every refresh, not just once: cardinality
//! drifts as indexed data grows.

use crate::{
    source::{SourceError, SourceQueryExecutor},
    types::{Attribute, DataType},
};
use tracing::trace;

/// Attributes at or above this many distinct values are no longer counted or
/// enumerated.
pub const LOW_CARDINALITY_THRESHOLD: u64 = 1000;

/// Outcome of the per-attribute decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityDecision {
    /// Adopt the configured hint verbatim; the column is known-high-cardinality
    /// and never re-counted.
    AdoptHint(u64),
    /// Issue a distinct-count query and adopt its result.
    Count,
    /// Leave the attribute's cardinality unchanged.
    Keep,
}

/// Decides whether and how to compute an attribute's distinct-value count.
#[derive(Debug, Clone, Copy)]
pub struct CardinalityEngine {
    high_cardinality_limit: u64,
}

impl CardinalityEngine {
    #[must_use]
    pub fn new(high_cardinality_limit: u64) -> Self {
        Self { high_cardinality_limit }
    }

    /// Pure decision from type, currently known cardinality, and an optional
    /// operator hint. Unknown cardinality counts as zero, so a queryable
    /// column that has never been counted gets counted on its first refresh.
    #[must_use]
    pub fn decide(
        &self,
        data_type: DataType,
        known: Option<u64>,
        hint: Option<u64>,
    ) -> CardinalityDecision {
        if let Some(hint) = hint {
            if hint > self.high_cardinality_limit {
                return CardinalityDecision::AdoptHint(hint);
            }
        }

        if data_type.is_queryable() && known.unwrap_or(0) < LOW_CARDINALITY_THRESHOLD {
            return CardinalityDecision::Count;
        }

        CardinalityDecision::Keep
    }

    /// Applies the decision to one attribute, querying the source only when
    /// the decision calls for it.
    ///
    /// # Errors
    ///
    /// Propagates `SourceError` from the distinct-count query.
    pub async fn apply(
        &self,
        executor: &dyn SourceQueryExecutor,
        schema: &str,
        table: &str,
        attribute: &mut Attribute,
        hint: Option<u64>,
    ) -> Result<(), SourceError> {
        match self.decide(attribute.data_type, attribute.cardinality, hint) {
            CardinalityDecision::AdoptHint(hint) => {
                trace!(table, column = %attribute.name, hint, "adopting cardinality hint");
                attribute.cardinality = Some(hint);
            }
            CardinalityDecision::Count => {
                let count = executor.count_distinct(schema, table, &attribute.name).await?;
                trace!(table, column = %attribute.name, count, "counted distinct values");
                attribute.cardinality = Some(count);
            }
            CardinalityDecision::Keep => {}
        }
        Ok(())
    }
}
