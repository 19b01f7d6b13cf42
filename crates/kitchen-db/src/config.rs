//! Kitchen POS runtime configuration.
//!
//! Loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::pool::DbConfig;

/// Default tracing filter when neither `KITCHEN_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,kitchen=debug,sqlx=warn";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenConfig {
    /// SQLite database file (`KITCHEN_DB_PATH`)
    pub db_path: PathBuf,

    /// Pool size (`KITCHEN_DB_MAX_CONNECTIONS`)
    pub db_max_connections: u32,

    /// Apply embedded migrations on connect (`KITCHEN_RUN_MIGRATIONS`)
    pub run_migrations: bool,

    /// Tracing filter directive (`KITCHEN_LOG`)
    pub log_filter: String,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        KitchenConfig {
            db_path: PathBuf::from("./kitchen_dev.db"),
            db_max_connections: 5,
            run_migrations: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl KitchenConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = KitchenConfig::default();

        let config = KitchenConfig {
            db_path: lookup("KITCHEN_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            db_max_connections: match lookup("KITCHEN_DB_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("KITCHEN_DB_MAX_CONNECTIONS".to_string()))?,
                None => defaults.db_max_connections,
            },

            run_migrations: match lookup("KITCHEN_RUN_MIGRATIONS") {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("KITCHEN_RUN_MIGRATIONS".to_string()))?,
                None => defaults.run_migrations,
            },

            log_filter: lookup("KITCHEN_LOG").unwrap_or(defaults.log_filter),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("KITCHEN_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.db_path.clone())
            .max_connections(self.db_max_connections)
            .run_migrations(self.run_migrations)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = KitchenConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, KitchenConfig::default());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_overrides() {
        let config = KitchenConfig::from_lookup(lookup(&[
            ("KITCHEN_DB_PATH", "/tmp/kitchen.db"),
            ("KITCHEN_DB_MAX_CONNECTIONS", "8"),
            ("KITCHEN_RUN_MIGRATIONS", "false"),
            ("KITCHEN_LOG", "warn"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/kitchen.db"));
        assert_eq!(config.db_max_connections, 8);
        assert!(!config.run_migrations);
        assert_eq!(config.log_filter, "warn");

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert!(!db.run_migrations);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("KITCHEN_DB_MAX_CONNECTIONS", "many"),
            ("KITCHEN_DB_MAX_CONNECTIONS", "0"),
            ("KITCHEN_RUN_MIGRATIONS", "yes please"),
        ] {
            let err = KitchenConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == key));
        }
    }
}
