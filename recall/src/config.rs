use crate::logger::Level;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;

fn default_enabled() -> bool {
    true
}

/// Runtime knobs of a [`Registry`](crate::Registry).
///
/// ```toml
/// enabled = true
/// default_at_most = 1000
/// log_level = "warn"
///
/// [operations."billing::quote"]
/// at_most = 10
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct MemoConfig {
    /// When false every call bypasses its cache.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Capacity used for operations declared without `at_most`.
    #[serde(default)]
    pub default_at_most: Option<usize>,
    /// Process-wide threshold, installed by [`MemoConfig::init_logging`].
    #[serde(default)]
    pub log_level: Option<Level>,
    #[serde(default)]
    pub operations: HashMap<String, OperationSettings>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OperationSettings {
    pub at_most: Option<usize>,
}

impl Default for MemoConfig {
    fn default() -> Self {
        MemoConfig { enabled: true, default_at_most: None, log_level: None, operations: HashMap::new() }
    }
}

impl MemoConfig {
    /// Loads `path` and lets `RECALL__*` environment variables override it.
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder =
            Config::builder()
                .add_source(File::with_name(path).required(true))
                .add_source(Self::environment());
        builder.build()?.try_deserialize()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder().add_source(Self::environment()).build()?.try_deserialize()
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder().add_source(File::from_str(toml, FileFormat::Toml)).build()?.try_deserialize()
    }

    /// Installs `log_level` as the process-wide threshold; a no-op when unset.
    pub fn init_logging(&self) {
        if let Some(level) = self.log_level {
            crate::logger::set_level(level);
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("RECALL").try_parsing(true).separator("__")
    }

    /// Capacity an operation ends up with: its configured override, else the
    /// declared value, else the configured default.
    pub fn effective_capacity(&self, id: &str, declared: Option<usize>) -> Option<usize> {
        self.operations
            .get(id)
            .and_then(|op| op.at_most)
            .or(declared)
            .or(self.default_at_most)
    }
}
