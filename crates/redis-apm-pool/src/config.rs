//! Pool configuration
//!
//! Builder-style options for the underlying `deadpool-redis` pool, plus an
//! environment loader for services that configure Redis through env vars.

use crate::address::{Network, NetworkParseError};
use std::time::Duration;
use thiserror::Error;

/// Default pool size when none is configured
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Options for the wrapped pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolOptions {
    /// How long a caller waits for a free connection
    pub wait_timeout: Option<Duration>,
    /// How long establishing a new connection may take
    pub create_timeout: Option<Duration>,
    /// How long recycling a returned connection may take
    pub recycle_timeout: Option<Duration>,
}

impl PoolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    pub fn with_create_timeout(mut self, timeout: Duration) -> Self {
        self.create_timeout = Some(timeout);
        self
    }

    pub fn with_recycle_timeout(mut self, timeout: Duration) -> Self {
        self.recycle_timeout = Some(timeout);
        self
    }

    /// Translate into the `deadpool` pool configuration
    pub fn to_deadpool(&self, size: usize) -> deadpool_redis::PoolConfig {
        let mut config = deadpool_redis::PoolConfig::new(size);
        config.timeouts = deadpool_redis::Timeouts {
            wait: self.wait_timeout,
            create: self.create_timeout,
            recycle: self.recycle_timeout,
        };
        config
    }
}

/// Everything needed to construct an instrumented pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub network: Network,
    pub address: String,
    pub size: usize,
    pub options: PoolOptions,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            network: Network::Tcp,
            address: "redis://localhost:6379".to_string(),
            size: DEFAULT_POOL_SIZE,
            options: PoolOptions::default(),
        }
    }
}

impl PoolConfig {
    /// Config for a TCP address
    pub fn tcp(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Config for a Unix socket path
    pub fn unix(path: impl Into<String>) -> Self {
        Self {
            network: Network::Unix,
            address: path.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_options(mut self, options: PoolOptions) -> Self {
        self.options = options;
        self
    }

    /// Load from `REDIS_NETWORK`, `REDIS_ADDR`, `REDIS_POOL_SIZE` and
    /// `REDIS_POOL_WAIT_TIMEOUT` (humantime syntax, e.g. `250ms`).
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(network) = lookup("REDIS_NETWORK") {
            config.network = network.parse()?;
        }
        if let Some(address) = lookup("REDIS_ADDR") {
            config.address = address;
        }
        if let Some(size) = lookup("REDIS_POOL_SIZE") {
            config.size = size.parse().map_err(|_| ConfigError::InvalidValue {
                key: "REDIS_POOL_SIZE",
                value: size.clone(),
            })?;
        }
        if let Some(timeout) = lookup("REDIS_POOL_WAIT_TIMEOUT") {
            let parsed =
                humantime::parse_duration(&timeout).map_err(|_| ConfigError::InvalidValue {
                    key: "REDIS_POOL_WAIT_TIMEOUT",
                    value: timeout.clone(),
                })?;
            config.options.wait_timeout = Some(parsed);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.is_empty() {
            return Err(ConfigError::EmptyAddress);
        }
        if self.size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "REDIS_POOL_SIZE",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Network(#[from] NetworkParseError),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Redis address cannot be empty")]
    EmptyAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = PoolConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PoolConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = PoolConfig::from_lookup(lookup(&[
            ("REDIS_NETWORK", "unix"),
            ("REDIS_ADDR", "/tmp/redis.sock"),
            ("REDIS_POOL_SIZE", "32"),
            ("REDIS_POOL_WAIT_TIMEOUT", "250ms"),
        ]))
        .unwrap();

        assert_eq!(config.network, Network::Unix);
        assert_eq!(config.address, "/tmp/redis.sock");
        assert_eq!(config.size, 32);
        assert_eq!(config.options.wait_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_invalid_env_values() {
        assert!(matches!(
            PoolConfig::from_lookup(lookup(&[("REDIS_POOL_SIZE", "many")])),
            Err(ConfigError::InvalidValue { key: "REDIS_POOL_SIZE", .. })
        ));
        assert!(matches!(
            PoolConfig::from_lookup(lookup(&[("REDIS_NETWORK", "udp")])),
            Err(ConfigError::Network(_))
        ));
        assert!(matches!(
            PoolConfig::from_lookup(lookup(&[("REDIS_POOL_WAIT_TIMEOUT", "soon")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(
            PoolConfig::from_lookup(lookup(&[("REDIS_ADDR", "")])),
            Err(ConfigError::EmptyAddress)
        );
    }

    #[test]
    fn test_options_to_deadpool() {
        let options = PoolOptions::new()
            .with_wait_timeout(Duration::from_secs(1))
            .with_recycle_timeout(Duration::from_secs(5));
        let deadpool = options.to_deadpool(8);

        assert_eq!(deadpool.max_size, 8);
        assert_eq!(deadpool.timeouts.wait, Some(Duration::from_secs(1)));
        assert_eq!(deadpool.timeouts.create, None);
        assert_eq!(deadpool.timeouts.recycle, Some(Duration::from_secs(5)));
    }
}
