//! Cache configuration types and loading.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use vasari_error::{CacheError, CacheErrorKind, ConfigError, VasariResult};

/// Configuration for the timed cache.
///
/// The defaults reproduce the tuning the cache shipped with: room for a
/// thousand entities, a 30 minute staleness horizon, sweeping only once
/// the cache is 90% full, on a 5 minute cadence. All four are knobs, not
/// constants.
#[derive(
    Debug,
    Clone,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct CacheConfig {
    /// Maximum number of cached entries
    #[serde(default = "default_capacity")]
    capacity: usize,

    /// Seconds an entry may go unread before the sweep removes it
    #[serde(default = "default_staleness_secs")]
    staleness_secs: u64,

    /// Fill ratio above which the sweep does real work
    #[serde(default = "default_high_water_ratio")]
    high_water_ratio: f64,

    /// Seconds between scheduled sweeps
    #[serde(default = "default_sweep_interval_secs")]
    sweep_interval_secs: u64,
}

fn default_capacity() -> usize {
    1000
}

fn default_staleness_secs() -> u64 {
    1800 // 30 minutes
}

fn default_high_water_ratio() -> f64 {
    0.9
}

fn default_sweep_interval_secs() -> u64 {
    300 // 5 minutes
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            staleness_secs: default_staleness_secs(),
            high_water_ratio: default_high_water_ratio(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl CacheConfig {
    /// Staleness horizon as a duration.
    pub fn staleness(&self) -> Duration {
        Duration::from_secs(self.staleness_secs)
    }

    /// Sweep cadence as a duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Entry count at which the sweep starts doing work.
    pub fn high_water_mark(&self) -> usize {
        (self.capacity as f64 * self.high_water_ratio).ceil() as usize
    }

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `capacity` is zero
    /// - `high_water_ratio` falls outside `(0, 1]`
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::new(CacheErrorKind::ZeroCapacity));
        }

        if !self.high_water_ratio.is_finite()
            || self.high_water_ratio <= 0.0
            || self.high_water_ratio > 1.0
        {
            return Err(CacheError::new(CacheErrorKind::InvalidHighWaterRatio(
                self.high_water_ratio,
            )));
        }

        Ok(())
    }

    /// Load cache configuration from a TOML file.
    ///
    /// The file uses a `[cache]` section:
    ///
    /// ```toml
    /// [cache]
    /// capacity = 500
    /// staleness_secs = 900
    /// ```
    ///
    /// Omitted fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, the TOML does not parse,
    /// or the resulting configuration fails [`CacheConfig::validate`].
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> VasariResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading cache config from file");

        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let file: ConfigFile = toml::from_str(&contents)
            .map_err(|e| ConfigError::new(format!("Invalid TOML in {}: {}", path.display(), e)))?;

        let config = file.cache;
        config.validate()?;

        tracing::info!(
            capacity = config.capacity,
            staleness_secs = config.staleness_secs,
            sweep_interval_secs = config.sweep_interval_secs,
            "Loaded cache configuration"
        );

        Ok(config)
    }
}

/// Internal TOML file structure.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    cache: CacheConfig,
}
