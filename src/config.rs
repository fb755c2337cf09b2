//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::error::{CacheError, Result};

/// Default capacity used when none is configured
pub const DEFAULT_CAPACITY: usize = 1000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold (0 disables storage)
    pub capacity: usize,
    /// Idle time after which an entry is considered expired
    pub ttl: Duration,
    /// Interval for the opt-in purge task, None = lazy expiration only
    pub purge_interval: Option<Duration>,
}

impl Config {
    /// Builds a config from signed values, rejecting a negative capacity or a
    /// non-positive TTL instead of clamping them.
    pub fn new(capacity: i64, ttl_secs: i64) -> Result<Self> {
        let capacity = validate_capacity(capacity)?;
        let ttl = validate_ttl_secs(ttl_secs)?;
        Ok(Self {
            capacity,
            ttl,
            purge_interval: None,
        })
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FREQ_CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `FREQ_CACHE_TTL_SECS` - Idle TTL in seconds (default: 3600)
    /// - `FREQ_CACHE_PURGE_INTERVAL_SECS` - Purge task interval (default: unset)
    ///
    /// Unparseable values fall back to the default. A negative capacity or a
    /// TTL of zero or less is an error.
    pub fn from_env() -> Result<Self> {
        let capacity = match read_var::<i64>("FREQ_CACHE_CAPACITY") {
            Some(raw) => validate_capacity(raw)?,
            None => DEFAULT_CAPACITY,
        };
        let ttl = match read_var::<i64>("FREQ_CACHE_TTL_SECS") {
            Some(raw) => validate_ttl_secs(raw)?,
            None => DEFAULT_TTL,
        };
        let purge_interval = read_var::<u64>("FREQ_CACHE_PURGE_INTERVAL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            capacity,
            ttl,
            purge_interval,
        })
    }

    /// Sets the purge task interval.
    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval = Some(interval);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
            purge_interval: None,
        }
    }
}

fn read_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn validate_capacity(capacity: i64) -> Result<usize> {
    usize::try_from(capacity).map_err(|_| {
        CacheError::InvalidArgument(format!("capacity must be >= 0, got {}", capacity))
    })
}

fn validate_ttl_secs(ttl_secs: i64) -> Result<Duration> {
    if ttl_secs <= 0 {
        return Err(CacheError::InvalidArgument(format!(
            "ttl must be positive, got {}s",
            ttl_secs
        )));
    }
    Ok(Duration::from_secs(ttl_secs as u64))
}
