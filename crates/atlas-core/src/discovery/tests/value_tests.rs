//! Attribute-value listing: cache-backed prefix lookups, validation, and the
//! live query path.

use super::{create_discovery, pairs, settle, test_config};
use crate::{
    config::AttributeCacheConfig,
    discovery::ValidationError,
    types::{AttributePath, DataType},
};
use std::{sync::atomic::Ordering, time::Duration};

fn path(column: &str) -> AttributePath {
    AttributePath {
        platform: "ethereum".to_string(),
        network: "mainnet".to_string(),
        entity: "token_transfers".to_string(),
        column: column.to_string(),
    }
}

#[tokio::test]
async fn short_filter_on_cached_attribute_fails_without_querying() {
    let config = test_config();
    let (discovery, executor) = create_discovery(config.clone());
    discovery.init(&pairs(&config)).await.expect("warm-up succeeds");

    let calls_before = executor.select_distinct_calls.load(Ordering::Acquire);
    let result = discovery.list_attribute_values(&path("token_symbol"), Some("w")).await;

    assert_eq!(result, Err(vec![ValidationError::InvalidAttributeFilterLength(2)]));
    assert_eq!(executor.select_distinct_calls.load(Ordering::Acquire), calls_before);
    assert_eq!(executor.select_filtered_calls.load(Ordering::Acquire), 0);
}

#[tokio::test]
async fn cached_attribute_serves_prefix_matches_in_original_case() {
    let config = test_config();
    let (discovery, _executor) = create_discovery(config.clone());
    discovery.init(&pairs(&config)).await.expect("warm-up succeeds");

    let hits = discovery
        .list_attribute_values(&path("token_symbol"), Some("da"))
        .await
        .expect("valid lookup");
    assert_eq!(hits, vec!["DAI".to_string()]);

    let none = discovery
        .list_attribute_values(&path("token_symbol"), Some("xyz"))
        .await
        .expect("valid lookup");
    assert!(none.is_empty());
}

#[tokio::test(start_paused = true)]
async fn stale_index_is_served_then_rebuilt() {
    let config = test_config();
    let ttl = config.cache_ttl();
    let (discovery, executor) = create_discovery(config.clone());
    discovery.init(&pairs(&config)).await.expect("warm-up succeeds");

    executor.set_distinct_values("token_transfers", "token_symbol", &["WETH", "DAI", "DOGE"]);
    tokio::time::advance(ttl + Duration::from_secs(1)).await;

    let stale = discovery
        .list_attribute_values(&path("token_symbol"), Some("do"))
        .await
        .expect("valid lookup");
    assert!(stale.is_empty(), "stale index does not yet contain the new value");

    settle().await;

    let rebuilt = discovery
        .list_attribute_values(&path("token_symbol"), Some("do"))
        .await
        .expect("valid lookup");
    assert_eq!(rebuilt, vec!["DOGE".to_string()]);
}

#[tokio::test]
async fn date_attribute_is_rejected_regardless_of_cardinality() {
    let config = test_config();
    let (discovery, _executor) = create_discovery(config.clone());
    discovery.init(&pairs(&config)).await.expect("warm-up succeeds");

    let result = discovery.list_attribute_values(&path("block_date"), Some("2024")).await;
    assert_eq!(result, Err(vec![ValidationError::InvalidAttributeDataType(DataType::Date)]));
}

#[tokio::test]
async fn violations_are_collected_not_short_circuited() {
    let mut config = test_config();
    config.attribute_cache.push(AttributeCacheConfig {
        platform: "ethereum".to_string(),
        entity: "token_transfers".to_string(),
        column: "block_date".to_string(),
        cached: false,
        min_match_length: 3,
        max_result_length: 10,
        cardinality_hint: Some(20_000),
    });
    let (discovery, _executor) = create_discovery(config.clone());
    let pairs = pairs(&config);
    discovery.init(&pairs).await.expect("warm-up succeeds");
    discovery.init_attributes_cache(&pairs).await.expect("cardinality warm-up succeeds");

    let result = discovery.list_attribute_values(&path("block_date"), None).await;
    assert_eq!(
        result,
        Err(vec![
            ValidationError::InvalidAttributeDataType(DataType::Date),
            ValidationError::HighCardinalityAttribute(20_000),
        ])
    );
}

#[tokio::test]
async fn high_cardinality_attribute_is_rejected() {
    let config = test_config();
    let (discovery, executor) = create_discovery(config.clone());
    executor.set_distinct_count("token_transfers", "sender", 5_000);
    let pairs = pairs(&config);
    discovery.init(&pairs).await.expect("warm-up succeeds");
    discovery.init_attributes_cache(&pairs).await.expect("cardinality warm-up succeeds");

    let result = discovery.list_attribute_values(&path("sender"), None).await;
    assert_eq!(result, Err(vec![ValidationError::HighCardinalityAttribute(5_000)]));
}

#[tokio::test]
async fn valid_uncached_attribute_is_queried_live() {
    let config = test_config();
    let (discovery, executor) = create_discovery(config.clone());
    let pairs = pairs(&config);
    discovery.init(&pairs).await.expect("warm-up succeeds");
    discovery.init_attributes_cache(&pairs).await.expect("cardinality warm-up succeeds");

    let filtered = discovery
        .list_attribute_values(&path("sender"), Some("0xa"))
        .await
        .expect("valid lookup");
    assert_eq!(filtered, vec!["0xabc".to_string()]);
    assert_eq!(executor.select_filtered_calls.load(Ordering::Acquire), 1);

    let all =
        discovery.list_attribute_values(&path("sender"), None).await.expect("valid lookup");
    assert_eq!(all.len(), 2);

    // Live results never land in the value-index category.
    assert_eq!(discovery.store().stats().value_indexes, 1);
}

#[tokio::test]
async fn unknown_attribute_degrades_to_empty() {
    let config = test_config();
    let (discovery, _executor) = create_discovery(config.clone());
    discovery.init(&pairs(&config)).await.expect("warm-up succeeds");

    let result =
        discovery.list_attribute_values(&path("no_such_column"), Some("abc")).await;
    assert_eq!(result, Ok(Vec::new()));
}
