//! # Atlas Core
//!
//! Core library for the Atlas metadata-discovery service for blockchain-indexed
//! relational data.
//!
//! This crate provides the foundational components for:
//!
//! - **[`cache`]**: TTL-governed metadata caching with a concurrent keyed store,
//!   a case-insensitive prefix index for typeahead value lookups, and a
//!   cardinality engine that decides when distinct-counting is safe.
//!
//! - **[`discovery`]**: The orchestrator exposing entity, attribute, and
//!   attribute-value lookups with stale-while-revalidate semantics and a
//!   two-phase bulk warm-up.
//!
//! - **[`source`]**: The boundary to the relational source: schema introspection
//!   and distinct-value/count queries behind an async trait.
//!
//! - **[`config`]**: Layered configuration (defaults, TOML file, environment)
//!   for platforms, cache TTL, and per-attribute value-cache overrides.
//!
//! - **[`types`]**: The domain model shared by all components.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    MetadataDiscovery                     │
//! │  ┌────────────────┐  ┌──────────────────┐                │
//! │  │ MetadataStore  │  │ CardinalityEngine│                │
//! │  └───────┬────────┘  └────────┬─────────┘                │
//! │          │                    │                          │
//! │  ┌───────▼────────┐  ┌────────▼─────────┐                │
//! │  │ EntitiesCache  │  │ SourceQuery      │                │
//! │  │ AttributesCache│  │ Executor (trait) │                │
//! │  │ PrefixIndexes  │  └──────────────────┘                │
//! │  └────────────────┘                                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read Flow
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────┐
//! │ Cache Check │ ─── Absent ──► Empty Result
//! └──────┬──────┘
//!        │ Present
//!        ▼
//! ┌─────────────┐      stale      ┌─────────────────────┐
//! │ TTL Check   │ ───────────────►│ Spawn Refresh Task  │
//! └──────┬──────┘  (not awaited)  │ (overwrite on done) │
//!        │                        └─────────────────────┘
//!        ▼
//!  Cached Snapshot to Client
//! ```
//!
//! Reads never block on source queries: an expired entry is served as-is while
//! a background task recomputes it for future readers.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod source;
pub mod types;
