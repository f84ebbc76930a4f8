//! Group guard configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Separator for required groups given as one string ("admin|staff")
    /// Env: RS_GROUPS_GUARD_DELIMITER
    /// Default: "|"
    pub delimiter: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { delimiter: "|".to_string() }
    }
}

impl GuardConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(delimiter) = env::var("RS_GROUPS_GUARD_DELIMITER") {
            self.delimiter = delimiter;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            bail!("guard delimiter must not be empty");
        }
        Ok(())
    }
}
