//! Solver configuration, loaded from TOML.
//!
//! ```
//! use posetcover::SolverConfig;
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     max_labels = 6
//!     time_limit_seconds = 30
//!     parallel = false
//! "#).unwrap();
//!
//! assert_eq!(config.max_labels, 6);
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest label count the solver accepts unless configured otherwise.
pub const DEFAULT_MAX_LABELS: usize = 8;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`SolverConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The values parsed but are out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Limits for [`Solver`](crate::Solver).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    /// Inputs with more labels than this are rejected. Linear extension enumeration is factorial in the label count.
    pub max_labels: usize,

    /// Give up with [`CoverError::DeadlineExceeded`](crate::CoverError::DeadlineExceeded) after this many seconds.
    pub time_limit_seconds: Option<u64>,

    /// Fan connected components and anchor groups out over the rayon pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_labels: DEFAULT_MAX_LABELS,
            time_limit_seconds: None,
            parallel: true,
        }
    }
}

impl SolverConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a zero label limit and a zero time limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_labels == 0 {
            return Err(ConfigError::Invalid("max_labels must be at least 1".to_string()));
        }
        if self.time_limit_seconds == Some(0) {
            return Err(ConfigError::Invalid("time_limit_seconds must be positive".to_string()));
        }
        Ok(())
    }

    /// The time limit as a [`Duration`].
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds.map(Duration::from_secs)
    }

    /// Sets [`max_labels`](Self::max_labels).
    pub fn with_max_labels(mut self, max_labels: usize) -> Self {
        self.max_labels = max_labels;
        self
    }

    /// Sets [`time_limit_seconds`](Self::time_limit_seconds).
    pub fn with_time_limit_seconds(mut self, seconds: u64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    /// Sets [`parallel`](Self::parallel).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
