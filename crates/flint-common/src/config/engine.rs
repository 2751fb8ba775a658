//! Engine configuration structures.
//!
//! These structures define all configurable aspects of a flint engine.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_APPROX_DISTINCT_RSD, DEFAULT_BATCH_SIZE, DEFAULT_SLOW_QUERY_THRESHOLD_MS,
    MAX_APPROX_DISTINCT_RSD, MIN_APPROX_DISTINCT_RSD,
};
use crate::error::{FlintError, FlintResult};

/// Main engine configuration.
///
/// # Example
///
/// ```rust
/// use flint_common::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.execution.batch_size, 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executor settings.
    pub execution: ExecutionSettings,

    /// Session catalog settings.
    pub catalog: CatalogSettings,

    /// Log every direct execution at info level.
    pub query_logging: bool,

    /// Executions slower than this are logged as warnings.
    #[serde(with = "humantime_serde")]
    pub slow_query_threshold: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionSettings::default(),
            catalog: CatalogSettings::default(),
            query_logging: false,
            slow_query_threshold: Duration::from_millis(DEFAULT_SLOW_QUERY_THRESHOLD_MS),
        }
    }
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration tuned for tests: small batches, query logging on.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            execution: ExecutionSettings {
                batch_size: 4,
                ..Default::default()
            },
            query_logging: true,
            ..Default::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FlintResult<()> {
        self.execution.validate()
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Converts configuration to TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Creates a builder for configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}

/// Executor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Rows per batch pulled between operators.
    /// Default: 1024
    pub batch_size: usize,

    /// Relative standard deviation of approximate distinct counts.
    /// Default: 0.05
    pub approx_distinct_rsd: f64,

    /// Fail on integer overflow and division by zero instead of wrapping
    /// and returning NULL.
    /// Default: false
    pub ansi_arithmetic: bool,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            approx_distinct_rsd: DEFAULT_APPROX_DISTINCT_RSD,
            ansi_arithmetic: false,
        }
    }
}

impl ExecutionSettings {
    /// Validates the settings.
    pub fn validate(&self) -> FlintResult<()> {
        if self.batch_size == 0 {
            return Err(FlintError::InvalidConfig {
                message: "execution.batch_size must be positive".to_string(),
            });
        }
        if !(MIN_APPROX_DISTINCT_RSD..=MAX_APPROX_DISTINCT_RSD).contains(&self.approx_distinct_rsd)
        {
            return Err(FlintError::InvalidConfig {
                message: format!(
                    "execution.approx_distinct_rsd must be within [{}, {}], got {}",
                    MIN_APPROX_DISTINCT_RSD, MAX_APPROX_DISTINCT_RSD, self.approx_distinct_rsd
                ),
            });
        }
        Ok(())
    }

    /// Returns the HyperLogLog++ precision for the configured error.
    ///
    /// `p = ceil(2 * log2(1.106 / rsd))`, clamped to the sketch's supported range.
    #[must_use]
    pub fn hll_precision(&self) -> u8 {
        let p = (2.0 * (1.106 / self.approx_distinct_rsd).log2()).ceil();
        p.clamp(4.0, 18.0) as u8
    }
}

/// Session catalog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Match view and function names case-sensitively.
    /// Default: false
    pub case_sensitive: bool,
}

impl CatalogSettings {
    /// Normalizes a view or function name for catalog lookups.
    #[must_use]
    pub fn normalize(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }
}

/// Builder for engine configuration.
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.execution.batch_size = batch_size;
        self
    }

    /// Sets the approximate distinct count error.
    pub fn approx_distinct_rsd(mut self, rsd: f64) -> Self {
        self.config.execution.approx_distinct_rsd = rsd;
        self
    }

    /// Enables ANSI arithmetic: overflow and division by zero are errors.
    pub fn ansi_arithmetic(mut self, enabled: bool) -> Self {
        self.config.execution.ansi_arithmetic = enabled;
        self
    }

    /// Sets case-sensitive catalog names.
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.config.catalog.case_sensitive = enabled;
        self
    }

    /// Enables query logging.
    pub fn query_logging(mut self, enabled: bool) -> Self {
        self.config.query_logging = enabled;
        self
    }

    /// Sets the slow query threshold.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.config.slow_query_threshold = threshold;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> EngineConfig {
        self.config
    }
}

/// Serde helper for Duration using humantime format.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        s.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
