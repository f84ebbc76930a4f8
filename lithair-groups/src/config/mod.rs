//! Configuration for lithair-groups
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (builder methods on the manager / guard)
//! 2. **Environment Variables** (`RS_GROUPS_*`, `RS_LOG_LEVEL`)
//! 3. **Config File** (`groups.toml`)
//! 4. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use lithair_groups::config::GroupsConfig;
//!
//! let config = GroupsConfig::load()?;
//! assert_eq!(config.tables.role_group_table, "role_group");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cache;
pub mod guard;
pub mod logging;
pub mod tables;

pub use cache::CacheConfig;
pub use guard::GuardConfig;
pub use logging::LoggingConfig;
pub use tables::{GroupModelConfig, TablesConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "groups.toml";

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsConfig {
    pub tables: TablesConfig,
    pub groups: GroupModelConfig,
    pub cache: CacheConfig,
    pub guard: GuardConfig,
    pub logging: LoggingConfig,
}

impl GroupsConfig {
    /// Defaults, then `groups.toml` if present, then environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific file, with env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file, without env overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.tables.merge(other.tables);
        self.groups.merge(other.groups);
        self.cache.merge(other.cache);
        self.guard.merge(other.guard);
        self.logging.merge(other.logging);
    }

    pub fn apply_env_vars(&mut self) {
        self.tables.apply_env_vars();
        self.groups.apply_env_vars();
        self.cache.apply_env_vars();
        self.guard.apply_env_vars();
        self.logging.apply_env_vars();
    }

    pub fn validate(&self) -> Result<()> {
        self.tables.validate()?;
        self.groups.validate()?;
        self.cache.validate()?;
        self.guard.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Read an on/off environment value. `None` when it is neither
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InvalidationPolicy;
    use crate::model::RelationKind;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GroupsConfig::default();
        assert_eq!(config.tables.join_table(RelationKind::Roles), "role_group");
        assert_eq!(config.tables.join_table(RelationKind::Users), "group_user");
        assert_eq!(config.tables.related_key(RelationKind::Users), "user_id");
        assert_eq!(config.tables.group_foreign_key, "group_id");
        assert!(!config.groups.soft_deletes);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.invalidation, InvalidationPolicy::Kind);
        assert_eq!(config.guard.delimiter, "|");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[groups]
soft_deletes = true

[cache]
ttl_secs = 5
invalidation = "group"
"#
        )
        .unwrap();

        let config = GroupsConfig::from_file(file.path()).unwrap();
        assert!(config.groups.soft_deletes);
        assert_eq!(config.cache.ttl_secs, 5);
        assert_eq!(config.cache.invalidation, InvalidationPolicy::Group);
        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.tables.role_group_table, "role_group");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GroupsConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.tables, TablesConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = GroupsConfig::default();
        config.cache.backend = "redis".to_string();
        assert!(config.validate().is_err());

        let mut config = GroupsConfig::default();
        config.tables.group_user_table = config.tables.role_group_table.clone();
        assert!(config.validate().is_err());

        let mut config = GroupsConfig::default();
        config.guard.delimiter.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" on "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("No"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("enabled"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache\nttl_secs = ").unwrap();
        assert!(GroupsConfig::from_file(file.path()).is_err());
    }
}
