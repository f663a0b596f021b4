//! Discovery configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file passed to [`DiscoveryConfig::load`]
//! 3. **Environment variables**: `ATLAS_*` env vars override specific fields
//!
//! # Validation
//!
//! Configuration is validated at load time. Invalid configurations (zero TTL,
//! cached attributes with no minimum match length) return errors rather than
//! failing silently once traffic arrives.
//!
//! # Example
//!
//! ```toml
//! cache_ttl_seconds = 600
//! high_cardinality_limit = 10000
//!
//! [[platforms]]
//! name = "ethereum"
//! display_name = "Ethereum"
//!
//! [[platforms.networks]]
//! name = "mainnet"
//! display_name = "Mainnet"
//! path = "eth_mainnet"
//!
//! [[attribute_cache]]
//! platform = "ethereum"
//! entity = "token_transfers"
//! column = "token_symbol"
//! min_match_length = 2
//! max_result_length = 10
//! ```

use crate::types::{AttributePath, Network, Platform};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Top-level configuration for the discovery engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Freshness window for every cache category, in seconds. Defaults to `600`.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Cardinality hints above this value mark an attribute as known-high-cardinality,
    /// never to be distinct-counted. Defaults to `10000`.
    #[serde(default = "default_high_cardinality_limit")]
    pub high_cardinality_limit: u64,

    /// Platforms and their networks served by this process.
    #[serde(default)]
    pub platforms: Vec<PlatformConfig>,

    /// Per-attribute value-cache overrides and cardinality hints.
    #[serde(default)]
    pub attribute_cache: Vec<AttributeCacheConfig>,
}

fn default_cache_ttl_seconds() -> u64 {
    600
}

fn default_high_cardinality_limit() -> u64 {
    10_000
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
            high_cardinality_limit: default_high_cardinality_limit(),
            platforms: Vec::new(),
            attribute_cache: Vec::new(),
        }
    }
}

/// One platform and its deployed networks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

/// One network deployment, bound to a source schema path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub display_name: String,
    pub path: String,
}

/// Value-cache settings for one attribute, addressed by
/// `(platform, entity, column)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCacheConfig {
    pub platform: String,
    pub entity: String,
    pub column: String,

    /// Whether lookups are served from a pre-built prefix index. Defaults to `true`.
    #[serde(default = "default_cached")]
    pub cached: bool,

    /// Minimum filter length for cache-backed lookups. Defaults to `3`.
    #[serde(default = "default_min_match_length")]
    pub min_match_length: usize,

    /// Maximum number of values returned per lookup. Defaults to `10`.
    #[serde(default = "default_max_result_length")]
    pub max_result_length: usize,

    /// Known distinct-value count supplied by operators for columns too
    /// expensive to count.
    #[serde(default)]
    pub cardinality_hint: Option<u64>,
}

fn default_cached() -> bool {
    true
}

fn default_min_match_length() -> usize {
    3
}

fn default_max_result_length() -> usize {
    10
}

impl DiscoveryConfig {
    /// Loads configuration from defaults, a TOML file (missing files are
    /// tolerated), and `ATLAS_*` environment variables, then validates it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be parsed or validation fails.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let loaded: Self = Config::builder()
            .set_default("cache_ttl_seconds", 600)?
            .set_default("high_cardinality_limit", 10_000)?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("ATLAS").separator("__"))
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Validates invariants that would otherwise only surface under traffic.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_seconds == 0 {
            return Err(ConfigError::Message("cache_ttl_seconds must be non-zero".to_string()));
        }

        for entry in &self.attribute_cache {
            if entry.max_result_length == 0 {
                return Err(ConfigError::Message(format!(
                    "attribute_cache {}/{}/{}: max_result_length must be non-zero",
                    entry.platform, entry.entity, entry.column
                )));
            }
            if entry.cached && entry.min_match_length == 0 {
                return Err(ConfigError::Message(format!(
                    "attribute_cache {}/{}/{}: cached attributes need min_match_length >= 1",
                    entry.platform, entry.entity, entry.column
                )));
            }
        }

        Ok(())
    }

    /// Freshness window shared by all cache categories.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// All configured `(Platform, Network)` pairs, in configuration order.
    #[must_use]
    pub fn platform_network_pairs(&self) -> Vec<(Platform, Network)> {
        self.platforms
            .iter()
            .flat_map(|platform| {
                platform.networks.iter().map(|network| {
                    (
                        Platform {
                            name: platform.name.clone(),
                            display_name: platform.display_name.clone(),
                        },
                        Network {
                            name: network.name.clone(),
                            display_name: network.display_name.clone(),
                            platform: platform.name.clone(),
                            path: network.path.clone(),
                        },
                    )
                })
            })
            .collect()
    }

    /// Schema path for a platform/network pair, if configured.
    #[must_use]
    pub fn schema_path(&self, platform: &str, network: &str) -> Option<&str> {
        self.platforms
            .iter()
            .find(|p| p.name == platform)?
            .networks
            .iter()
            .find(|n| n.name == network)
            .map(|n| n.path.as_str())
    }

    /// Value-cache settings for an attribute, if any are configured.
    #[must_use]
    pub fn attribute_cache_config(&self, path: &AttributePath) -> Option<&AttributeCacheConfig> {
        self.attribute_cache.iter().find(|entry| {
            entry.platform == path.platform
                && entry.entity == path.entity
                && entry.column == path.column
        })
    }

    /// Whether `(platform, entity, column)` gets a prefix index built at warm-up.
    #[must_use]
    pub fn is_value_cached(&self, platform: &str, entity: &str, column: &str) -> bool {
        self.attribute_cache.iter().any(|entry| {
            entry.cached
                && entry.platform == platform
                && entry.entity == entity
                && entry.column == column
        })
    }

    /// Operator-supplied cardinality hint for an attribute, if any.
    #[must_use]
    pub fn cardinality_hint(&self, platform: &str, entity: &str, column: &str) -> Option<u64> {
        self.attribute_cache.iter().find_map(|entry| {
            (entry.platform == platform && entry.entity == entity && entry.column == column)
                .then_some(entry.cardinality_hint)
                .flatten()
        })
    }
}
