//! Configuration for SawitDB indexes and CDC hooks.
//!
//! Nothing here reads process state implicitly. Index settings are built in
//! code; CDC settings can be loaded from the environment, but only when the
//! caller asks for it via [`CdcConfig::from_env`].
//!
//! # Environment Variables
//! - `SAWIT_CDC_ADAPTER`: CDC adapter name (`cpo`, or unset/empty to disable)
//! - `SAWIT_CDC_FILE`: Path of the CDC log (required when the adapter is `cpo`)

use std::fmt;
use std::path::PathBuf;

use crate::common::{Error, Result};

/// Default maximum number of keys per node.
pub const DEFAULT_ORDER: usize = 32;

/// Smallest order for which node splitting is defined.
pub const MIN_ORDER: usize = 2;

/// Environment variable naming the CDC adapter.
pub const CDC_ADAPTER_ENV: &str = "SAWIT_CDC_ADAPTER";

/// Environment variable naming the CDC log file.
pub const CDC_FILE_ENV: &str = "SAWIT_CDC_FILE";

// ============================================================================
// INDEX CONFIGURATION
// ============================================================================

/// Settings for one ordered index.
///
/// `name` and `key_field` are opaque labels: the tree only reports them back
/// through statistics.
///
/// # Example
/// ```
/// use sawitdb::common::config::IndexConfig;
///
/// let config = IndexConfig::new()
///     .with_name("idx_users_umur")
///     .with_key_field("umur")
///     .with_order(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Index name, e.g. `idx_users_umur`.
    pub name: Option<String>,

    /// Table column the index covers.
    pub key_field: Option<String>,

    /// Maximum keys per node before a split is forced.
    pub order: usize,
}

impl IndexConfig {
    /// Create a config with the default order and no labels.
    pub fn new() -> Self {
        Self {
            name: None,
            key_field: None,
            order: DEFAULT_ORDER,
        }
    }

    /// Set the index name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the indexed column.
    pub fn with_key_field(mut self, key_field: impl Into<String>) -> Self {
        self.key_field = Some(key_field.into());
        self
    }

    /// Set the branching bound.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Check that the configuration describes a buildable index.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrder` if `order < MIN_ORDER`.
    pub fn validate(&self) -> Result<()> {
        if self.order < MIN_ORDER {
            return Err(Error::InvalidOrder {
                order: self.order,
                min: MIN_ORDER,
            });
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CDC CONFIGURATION
// ============================================================================

/// Where change-data-capture records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CdcAdapter {
    /// CDC is off; listeners receive events but write nothing.
    #[default]
    Disabled,

    /// Append every statement to a local log file.
    Cpo,
}

impl CdcAdapter {
    /// Parse an adapter name. Empty input means disabled.
    ///
    /// # Errors
    /// Returns `Error::Config` for unknown adapter names.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            "" => Ok(CdcAdapter::Disabled),
            v if v.eq_ignore_ascii_case("cpo") => Ok(CdcAdapter::Cpo),
            other => Err(Error::Config {
                name: CDC_ADAPTER_ENV.to_string(),
                message: format!("unknown adapter '{}'", other),
            }),
        }
    }
}

impl fmt::Display for CdcAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdcAdapter::Disabled => write!(f, "disabled"),
            CdcAdapter::Cpo => write!(f, "cpo"),
        }
    }
}

/// CDC settings, passed explicitly to [`crate::cdc::CdcLogWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CdcConfig {
    /// Log file path. Required when `adapter` is not `Disabled`.
    pub log_file: Option<PathBuf>,

    /// Selected adapter.
    pub adapter: CdcAdapter,
}

impl CdcConfig {
    /// CDC turned off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Append-to-file CDC at `path`.
    pub fn cpo(path: impl Into<PathBuf>) -> Self {
        Self {
            log_file: Some(path.into()),
            adapter: CdcAdapter::Cpo,
        }
    }

    /// Whether records should be written at all.
    pub fn is_enabled(&self) -> bool {
        self.adapter != CdcAdapter::Disabled
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// See [`CdcConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// touching the real environment.
    ///
    /// # Errors
    /// - `Error::Config` if the adapter name is unknown
    /// - `Error::Config` if an adapter is selected but no log file is set
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let adapter = match lookup(CDC_ADAPTER_ENV) {
            Some(value) => CdcAdapter::parse(&value)?,
            None => CdcAdapter::Disabled,
        };

        let log_file = lookup(CDC_FILE_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let config = Self { log_file, adapter };
        config.validate()?;
        Ok(config)
    }

    /// Check that an enabled adapter has somewhere to write.
    ///
    /// # Errors
    /// Returns `Error::Config` if the adapter is enabled without a log file.
    pub fn validate(&self) -> Result<()> {
        if self.is_enabled() && self.log_file.is_none() {
            return Err(Error::Config {
                name: CDC_FILE_ENV.to_string(),
                message: format!("required when adapter is '{}'", self.adapter),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_index_config() {
        let config = IndexConfig::default();
        assert_eq!(config.order, DEFAULT_ORDER);
        assert!(config.name.is_none());
        assert!(config.key_field.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_index_config_rejects_small_order() {
        let config = IndexConfig::new().with_order(1);
        match config.validate() {
            Err(Error::InvalidOrder { order: 1, min: MIN_ORDER }) => {}
            other => panic!("expected InvalidOrder, got {:?}", other),
        }

        assert!(IndexConfig::new().with_order(MIN_ORDER).validate().is_ok());
    }

    #[test]
    fn test_adapter_parse() {
        assert_eq!(CdcAdapter::parse("").unwrap(), CdcAdapter::Disabled);
        assert_eq!(CdcAdapter::parse("cpo").unwrap(), CdcAdapter::Cpo);
        assert_eq!(CdcAdapter::parse(" CPO ").unwrap(), CdcAdapter::Cpo);
        assert!(CdcAdapter::parse("kafka").is_err());
    }

    #[test]
    fn test_cdc_from_lookup_unset_is_disabled() {
        let config = CdcConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CdcConfig::disabled());
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_cdc_from_lookup_cpo() {
        let config = CdcConfig::from_lookup(lookup_from(&[
            (CDC_ADAPTER_ENV, "cpo"),
            (CDC_FILE_ENV, "/tmp/sawit.cdc"),
        ]))
        .unwrap();

        assert_eq!(config, CdcConfig::cpo("/tmp/sawit.cdc"));
        assert!(config.is_enabled());
    }

    #[test]
    fn test_cdc_from_lookup_cpo_requires_file() {
        let result = CdcConfig::from_lookup(lookup_from(&[(CDC_ADAPTER_ENV, "cpo")]));
        match result {
            Err(Error::Config { name, .. }) => assert_eq!(name, CDC_FILE_ENV),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_cdc_from_lookup_unknown_adapter() {
        let result = CdcConfig::from_lookup(lookup_from(&[
            (CDC_ADAPTER_ENV, "kafka"),
            (CDC_FILE_ENV, "/tmp/sawit.cdc"),
        ]));
        assert!(result.is_err());
    }
}
