//! Metadata caching engine.
//!
//! Three independent cache categories share one TTL and one store:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        MetadataStore                          │
//! │  (concurrent keyed categories + global CachingStatus cell)    │
//! └───────────────────────────────────────────────────────────────┘
//!          │                    │                      │
//!  ┌───────▼───────┐   ┌────────▼────────┐   ┌─────────▼─────────┐
//!  │ EntitiesCache │   │ AttributesCache │   │ AttributeValues   │
//!  │               │   │                 │   │ Cache             │
//!  │ (platform,    │   │ (platform,      │   │ (platform,        │
//!  │  network)     │   │  entity)        │   │  entity, column)  │
//!  │  → Vec<Entity>│   │  → Vec<Attr>    │   │  → PrefixIndex    │
//!  └───────────────┘   └─────────────────┘   └───────────────────┘
//! ```
//!
//! Entries are created by warm-up, refreshed in place by background
//! revalidation, and never deleted; turnover happens only through overwrite.
//! Every entry carries the monotonic instant it was last recomputed from
//! source, and value plus timestamp change together as one unit.
//!
//! The [`cardinality::CardinalityEngine`] decides, per attribute, whether a
//! distinct-count query is worth issuing at all: operator hints above the
//! high-cardinality limit are adopted without querying, non-queryable types
//! are never counted, and only columns still believed to be low-cardinality
//! get re-counted as data grows.

pub mod cardinality;
pub mod prefix_index;
pub mod store;

pub use cardinality::{CardinalityDecision, CardinalityEngine, LOW_CARDINALITY_THRESHOLD};
pub use prefix_index::PrefixIndex;
pub use store::{
    AttributeValuesKey, AttributesKey, CacheEntry, CacheStats, CachingStatus, EntitiesKey,
    MetadataStore,
};
