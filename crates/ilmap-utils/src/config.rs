//! # Configuration
//!
//! Environment-driven settings for symbol loading.
//!
//! - `ILMAP_SKIP_SYMBOL_PREFIXES`: comma-separated module name prefixes whose
//!   symbols are never loaded (default: `System.,SOS.`). An empty value
//!   disables skipping.
//! - `ILMAP_JUST_MY_CODE`: `true`/`false` (also `1`/`0`, `yes`/`no`,
//!   `on`/`off`); default `true`.

use std::env;

use thiserror::Error;

/// Environment variable holding the skip list.
pub const SKIP_PREFIXES_ENV: &str = "ILMAP_SKIP_SYMBOL_PREFIXES";
/// Environment variable toggling Just-My-Code.
pub const JUST_MY_CODE_ENV: &str = "ILMAP_JUST_MY_CODE";

/// Framework assemblies whose symbols are skipped unless configured otherwise.
pub const DEFAULT_SKIP_PREFIXES: &[&str] = &["System.", "SOS."];

/// Settings consumed by the debug-info loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSettings
{
    /// Module display-name prefixes excluded from symbol loading.
    pub skip_prefixes: Vec<String>,
    /// Whether Just-My-Code filtering is configured on loaded modules.
    pub just_my_code: bool,
}

impl Default for SymbolSettings
{
    fn default() -> Self
    {
        Self {
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(ToString::to_string).collect(),
            just_my_code: true,
        }
    }
}

impl SymbolSettings
{
    /// Read settings from the process environment.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to
    /// something that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup(SKIP_PREFIXES_ENV) {
            settings.skip_prefixes = parse_prefix_list(&raw);
        }

        if let Some(raw) = lookup(JUST_MY_CODE_ENV) {
            settings.just_my_code = parse_bool(JUST_MY_CODE_ENV, &raw)?;
        }

        tracing::debug!(
            skip_prefixes = ?settings.skip_prefixes,
            just_my_code = settings.just_my_code,
            "symbol settings loaded"
        );
        Ok(settings)
    }
}

fn parse_prefix_list(raw: &str) -> Vec<String>
{
    raw.split(',')
        .map(str::trim)
        .filter(|prefix| !prefix.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError>
{
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError
{
    /// A variable held a value of the wrong shape
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue
    {
        /// Variable name
        key: String,
        /// Rejected value
        value: String,
    },
}
