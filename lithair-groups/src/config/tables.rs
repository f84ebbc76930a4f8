//! Physical table and column names
//!
//! The engine only speaks in relation kinds; these names label log lines and
//! are what a SQL-backed store adapter reads to build its queries.

use crate::model::RelationKind;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    pub roles_table: String,
    pub users_table: String,
    pub groups_table: String,
    pub permissions_table: String,

    /// Env: RS_GROUPS_ROLE_GROUP_TABLE
    pub role_group_table: String,
    /// Env: RS_GROUPS_GROUP_USER_TABLE
    pub group_user_table: String,
    pub role_user_table: String,
    pub permission_role_table: String,

    pub role_foreign_key: String,
    pub user_foreign_key: String,
    pub group_foreign_key: String,
    pub permission_foreign_key: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            roles_table: "roles".to_string(),
            users_table: "users".to_string(),
            groups_table: "groups".to_string(),
            permissions_table: "permissions".to_string(),
            role_group_table: "role_group".to_string(),
            group_user_table: "group_user".to_string(),
            role_user_table: "role_user".to_string(),
            permission_role_table: "permission_role".to_string(),
            role_foreign_key: "role_id".to_string(),
            user_foreign_key: "user_id".to_string(),
            group_foreign_key: "group_id".to_string(),
            permission_foreign_key: "permission_id".to_string(),
        }
    }
}

impl TablesConfig {
    /// Join table backing a relation kind
    pub fn join_table(&self, kind: RelationKind) -> &str {
        match kind {
            RelationKind::Roles => &self.role_group_table,
            RelationKind::Users => &self.group_user_table,
        }
    }

    /// Foreign key of the related side of a relation kind
    pub fn related_key(&self, kind: RelationKind) -> &str {
        match kind {
            RelationKind::Roles => &self.role_foreign_key,
            RelationKind::Users => &self.user_foreign_key,
        }
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(table) = env::var("RS_GROUPS_ROLE_GROUP_TABLE") {
            self.role_group_table = table;
        }
        if let Ok(table) = env::var("RS_GROUPS_GROUP_USER_TABLE") {
            self.group_user_table = table;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.role_group_table.is_empty() || self.group_user_table.is_empty() {
            bail!("join table names must not be empty");
        }
        if self.role_group_table == self.group_user_table {
            bail!("role_group_table and group_user_table must differ");
        }
        Ok(())
    }
}

/// Capabilities of the group model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModelConfig {
    /// Groups are soft-deleted (relations kept until a force delete)
    /// Env: RS_GROUPS_SOFT_DELETES
    /// Default: false
    pub soft_deletes: bool,
}

impl GroupModelConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(soft) = env::var("RS_GROUPS_SOFT_DELETES") {
            match super::parse_flag(&soft) {
                Some(soft_deletes) => self.soft_deletes = soft_deletes,
                None => log::warn!("ignoring unknown RS_GROUPS_SOFT_DELETES={}", soft),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}
