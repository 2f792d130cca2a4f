//! Profiling configuration
//!
//! Resolved once when the hook is built. Environment toggles:
//! - `STEPWATCH_DISABLE`: any value disables profiling entirely
//! - `STEPWATCH_TOP_N`: number of steps listed in the summary (default 33)

use crate::cli::OutputFormat;
use thiserror::Error;

/// Environment variable that disables profiling when present
pub const DISABLE_ENV: &str = "STEPWATCH_DISABLE";

/// Environment variable overriding the number of ranked steps
pub const TOP_N_ENV: &str = "STEPWATCH_TOP_N";

/// Default number of ranked steps in the summary
pub const DEFAULT_TOP_N: usize = 33;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("STEPWATCH_TOP_N must be a non-negative integer, got {value:?}")]
    InvalidTopN { value: String },

    #[error("Invalid step pattern: {0}")]
    InvalidPattern(String),

    #[error("Step pattern {pattern:?} has no capture group for the step name")]
    MissingCapture { pattern: String },
}

/// Profiling configuration
///
/// # Example
/// ```
/// use stepwatch::config::ProfileConfig;
///
/// let config = ProfileConfig::default();
/// assert!(!config.disabled);
/// assert_eq!(config.top_n, 33);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Both callbacks become no-ops
    pub disabled: bool,
    /// Maximum number of steps in the ranked summary
    pub top_n: usize,
    /// Summary rendering
    pub format: OutputFormat,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            top_n: DEFAULT_TOP_N,
            format: OutputFormat::Text,
        }
    }
}

impl ProfileConfig {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            disabled: lookup(DISABLE_ENV).is_some(),
            ..Self::default()
        };

        if let Some(raw) = lookup(TOP_N_ENV) {
            config.top_n = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTopN { value: raw.clone() })?;
        }

        tracing::debug!(
            disabled = config.disabled,
            top_n = config.top_n,
            "resolved profile configuration"
        );
        Ok(config)
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}
