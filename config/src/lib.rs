//! # Configuration Management for PageHaus
//!
//! This crate provides centralized configuration structures for all PageHaus components:
//! the shared page cache, the scroll trigger and the signal system.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{CacheConfig, SignalConfig, TriggerConfig};
//!
//! // Cache configuration: page size, staleTime, gcTime, sweep interval
//! let cache_config = CacheConfig::new(10, 300, 600, 60);
//!
//! // Trigger configuration: throttle delay, root margin, visibility threshold
//! let trigger_config = TriggerConfig::new(500, 100, 0.0);
//!
//! // Signal configuration
//! let signal_config = SignalConfig::new(64);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [cache]
//! page_size = 10
//! stale_time_seconds = 300
//! gc_time_seconds = 600
//! gc_interval_seconds = 60
//!
//! [trigger]
//! throttle_delay_ms = 500
//! root_margin_px = 100
//! threshold = 0.0
//!
//! [signal]
//! max_callbacks = 64
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from pagehaus.toml (or the file named by PAGEHAUS_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path, time::Duration};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./pagehaus.toml";
const CONFIG_PATH_ENV: &str = "PAGEHAUS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub signal: SignalConfig,
}

/// Shared page cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// A page shorter than this ends pagination
    pub page_size: usize,
    /// How long a cache stays fresh after its last successful fetch
    pub stale_time_seconds: u64,
    /// How long an unmounted cache stays resident before eviction
    pub gc_time_seconds: u64,
    /// Period of the background eviction sweep
    pub gc_interval_seconds: u64,
}

/// Scroll trigger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub throttle_delay_ms: u64,
    /// Forwarded to the host's visibility observer
    pub root_margin_px: u32,
    /// Fraction of the sentinel that must be visible, forwarded to the host
    pub threshold: f32,
}

/// Signal system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub max_callbacks: usize,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err.into());
            }
        }

        let config = {
            // Path named in the environment (possibly via .env)
            if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
                Self::from_file(&config_path)
            }
            // Try to load config from DEFAULT_CONFIG_PATH
            else if Path::new(DEFAULT_CONFIG_PATH).exists() {
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            else {
                Err(ConfigError::Invalid(format!(
                    "Config path must be specified in .env file as {} or in {} file",
                    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH
                )))
            }
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Cache validations
        if self.cache.page_size == 0 {
            return Err(ConfigError::Invalid(
                "Cache page_size must be greater than 0".to_string(),
            ));
        }
        if self.cache.gc_time_seconds < self.cache.stale_time_seconds {
            return Err(ConfigError::Invalid(
                "Cache gc_time_seconds cannot be less than stale_time_seconds".to_string(),
            ));
        }
        if self.cache.gc_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Cache gc_interval_seconds must be greater than 0".to_string(),
            ));
        }

        // Trigger validations
        if !(0.0..=1.0).contains(&self.trigger.threshold) {
            return Err(ConfigError::Invalid(
                "Trigger threshold must be between 0 and 1".to_string(),
            ));
        }

        // Signal validations
        if self.signal.max_callbacks == 0 {
            return Err(ConfigError::Invalid(
                "Signal max_callbacks must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(
        page_size: usize,
        stale_time_seconds: u64,
        gc_time_seconds: u64,
        gc_interval_seconds: u64,
    ) -> Self {
        Self {
            page_size,
            stale_time_seconds,
            gc_time_seconds,
            gc_interval_seconds,
        }
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_seconds)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_seconds)
    }

    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            stale_time_seconds: 5 * 60,
            gc_time_seconds: 10 * 60,
            gc_interval_seconds: 60,
        }
    }
}

impl TriggerConfig {
    /// Create a new trigger configuration
    pub fn new(throttle_delay_ms: u64, root_margin_px: u32, threshold: f32) -> Self {
        Self {
            throttle_delay_ms,
            root_margin_px,
            threshold,
        }
    }

    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay_ms)
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            throttle_delay_ms: 500,
            root_margin_px: 100,
            threshold: 0.0,
        }
    }
}

impl SignalConfig {
    /// Create a new signal configuration
    pub fn new(max_callbacks: usize) -> Self {
        Self { max_callbacks }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { max_callbacks: 64 }
    }
}
