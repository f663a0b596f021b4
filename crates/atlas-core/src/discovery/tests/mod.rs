//! Tests for the discovery orchestrator and warm-up phases.
//!
//! Organized by functionality area; shared fixtures and the counting mock
//! executor live here. TTL behavior runs on a paused tokio clock so staleness
//! is deterministic, and background refreshes are settled with explicit
//! yields before asserting their effects.

use crate::{
    cache::MetadataStore,
    config::{AttributeCacheConfig, DiscoveryConfig, NetworkConfig, PlatformConfig},
    discovery::MetadataDiscovery,
    source::{
        ColumnDescriptor, IndexDescriptor, SourceError, SourceQueryExecutor, TableDescriptor,
    },
    types::{Network, Platform},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

// ============================================================================
// Mock Source Executor
// ============================================================================

/// In-memory source with per-method call counters, so tests can assert query
/// elision as well as results.
#[derive(Default)]
pub(crate) struct MockExecutor {
    tables: DashMap<String, Vec<TableDescriptor>>,
    row_counts: DashMap<String, u64>,
    distinct_values: DashMap<(String, String), Vec<String>>,
    distinct_counts: DashMap<(String, String), u64>,

    pub list_tables_calls: AtomicUsize,
    pub count_rows_calls: AtomicUsize,
    pub select_distinct_calls: AtomicUsize,
    pub select_filtered_calls: AtomicUsize,
    pub count_distinct_calls: AtomicUsize,

    fail: AtomicBool,
}

impl MockExecutor {
    pub(crate) fn set_tables(&self, schema: &str, tables: Vec<TableDescriptor>) {
        self.tables.insert(schema.to_string(), tables);
    }

    pub(crate) fn set_row_count(&self, table: &str, rows: u64) {
        self.row_counts.insert(table.to_string(), rows);
    }

    pub(crate) fn set_distinct_values(&self, table: &str, column: &str, values: &[&str]) {
        self.distinct_values.insert(
            (table.to_string(), column.to_string()),
            values.iter().map(ToString::to_string).collect(),
        );
    }

    pub(crate) fn set_distinct_count(&self, table: &str, column: &str, count: u64) {
        self.distinct_counts.insert((table.to_string(), column.to_string()), count);
    }

    /// Makes every subsequent query fail, for refresh-failure tests.
    pub(crate) fn fail_queries(&self, fail: bool) {
        self.fail.store(fail, Ordering::Release);
    }

    fn check_failure(&self) -> Result<(), SourceError> {
        if self.fail.load(Ordering::Acquire) {
            return Err(SourceError::Query("mock failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SourceQueryExecutor for MockExecutor {
    async fn list_tables(&self, schema: &str) -> Result<Vec<TableDescriptor>, SourceError> {
        self.list_tables_calls.fetch_add(1, Ordering::AcqRel);
        self.check_failure()?;
        self.tables
            .get(schema)
            .map(|tables| tables.clone())
            .ok_or_else(|| SourceError::UnknownSchema(schema.to_string()))
    }

    async fn count_rows(&self, _schema: &str, table: &str) -> Result<u64, SourceError> {
        self.count_rows_calls.fetch_add(1, Ordering::AcqRel);
        self.check_failure()?;
        Ok(self.row_counts.get(table).map_or(0, |rows| *rows))
    }

    async fn select_distinct(
        &self,
        _schema: &str,
        table: &str,
        column: &str,
    ) -> Result<Vec<String>, SourceError> {
        self.select_distinct_calls.fetch_add(1, Ordering::AcqRel);
        self.check_failure()?;
        Ok(self
            .distinct_values
            .get(&(table.to_string(), column.to_string()))
            .map(|values| values.clone())
            .unwrap_or_default())
    }

    async fn select_distinct_filtered(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        pattern: &str,
    ) -> Result<Vec<String>, SourceError> {
        self.select_filtered_calls.fetch_add(1, Ordering::AcqRel);
        let all = self.select_distinct(schema, table, column).await?;
        let needle = pattern.to_lowercase();
        Ok(all.into_iter().filter(|value| value.to_lowercase().contains(&needle)).collect())
    }

    async fn count_distinct(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> Result<u64, SourceError> {
        self.count_distinct_calls.fetch_add(1, Ordering::AcqRel);
        self.check_failure()?;
        if let Some(count) = self.distinct_counts.get(&(table.to_string(), column.to_string())) {
            return Ok(*count);
        }
        let values = self.select_distinct(schema, table, column).await?;
        self.select_distinct_calls.fetch_sub(1, Ordering::AcqRel);
        Ok(values.len() as u64)
    }
}

// ============================================================================
// Shared Fixtures
// ============================================================================

pub(crate) const SCHEMA: &str = "eth_mainnet";

pub(crate) fn transfers_table() -> TableDescriptor {
    TableDescriptor {
        name: "token_transfers".to_string(),
        columns: vec![
            ColumnDescriptor { name: "id".to_string(), source_type: "bigint".to_string() },
            ColumnDescriptor {
                name: "token_symbol".to_string(),
                source_type: "varchar(32)".to_string(),
            },
            ColumnDescriptor {
                name: "sender".to_string(),
                source_type: "varchar(64)".to_string(),
            },
            ColumnDescriptor {
                name: "block_time".to_string(),
                source_type: "timestamp".to_string(),
            },
            ColumnDescriptor { name: "block_date".to_string(), source_type: "date".to_string() },
        ],
        indexes: vec![IndexDescriptor {
            name: "idx_transfers_id".to_string(),
            columns: vec!["id".to_string()],
            unique: true,
        }],
        primary_keys: vec!["id".to_string()],
    }
}

pub(crate) fn blocks_table() -> TableDescriptor {
    TableDescriptor {
        name: "blocks".to_string(),
        columns: vec![
            ColumnDescriptor { name: "number".to_string(), source_type: "bigint".to_string() },
            ColumnDescriptor { name: "hash".to_string(), source_type: "varchar(66)".to_string() },
        ],
        indexes: Vec::new(),
        primary_keys: vec!["number".to_string()],
    }
}

/// Config with one platform/network pair and the `token_symbol` column backed
/// by a prefix index (min match 2, at most 5 results).
pub(crate) fn test_config() -> DiscoveryConfig {
    DiscoveryConfig {
        cache_ttl_seconds: 600,
        high_cardinality_limit: 10_000,
        platforms: vec![PlatformConfig {
            name: "ethereum".to_string(),
            display_name: "Ethereum".to_string(),
            networks: vec![NetworkConfig {
                name: "mainnet".to_string(),
                display_name: "Mainnet".to_string(),
                path: SCHEMA.to_string(),
            }],
        }],
        attribute_cache: vec![AttributeCacheConfig {
            platform: "ethereum".to_string(),
            entity: "token_transfers".to_string(),
            column: "token_symbol".to_string(),
            cached: true,
            min_match_length: 2,
            max_result_length: 5,
            cardinality_hint: None,
        }],
    }
}

pub(crate) fn pairs(config: &DiscoveryConfig) -> Vec<(Platform, Network)> {
    config.platform_network_pairs()
}

/// Builds a discovery instance over a mock populated with the two fixture
/// tables and a handful of token symbols.
pub(crate) fn create_discovery(config: DiscoveryConfig) -> (MetadataDiscovery, Arc<MockExecutor>) {
    let executor = Arc::new(MockExecutor::default());
    executor.set_tables(SCHEMA, vec![transfers_table(), blocks_table()]);
    executor.set_row_count("token_transfers", 1_000);
    executor.set_row_count("blocks", 500);
    executor.set_distinct_values("token_transfers", "token_symbol", &["WETH", "DAI", "USDC"]);
    executor.set_distinct_values("token_transfers", "sender", &["0xabc", "0xdef"]);

    let discovery = MetadataDiscovery::new(
        Arc::new(config),
        Arc::new(MetadataStore::new()),
        Arc::clone(&executor) as Arc<dyn SourceQueryExecutor>,
    );
    (discovery, executor)
}

/// Lets spawned fire-and-forget refresh tasks run to completion on the
/// current-thread test runtime.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Test Submodules
// ============================================================================

mod value_tests;
