//! Membership cache configuration

use crate::cache::InvalidationPolicy;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Env: RS_GROUPS_CACHE_ENABLED
    /// Default: true
    pub enabled: bool,

    /// "memory" or "none"
    /// Env: RS_GROUPS_CACHE_BACKEND
    /// Default: "memory"
    pub backend: String,

    /// Time-to-live of cached views, in seconds
    /// Env: RS_GROUPS_CACHE_TTL
    /// Default: 60
    pub ttl_secs: u64,

    /// "kind" flushes every group's view of the mutated kind, "group" only
    /// the mutated group's
    /// Env: RS_GROUPS_CACHE_INVALIDATION
    /// Default: "kind"
    pub invalidation: InvalidationPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "memory".to_string(),
            ttl_secs: 60,
            invalidation: InvalidationPolicy::Kind,
        }
    }
}

impl CacheConfig {
    pub fn merge(&mut self, other: Self) {
        self.enabled = other.enabled;
        self.backend = other.backend;
        self.ttl_secs = other.ttl_secs;
        self.invalidation = other.invalidation;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(enabled) = env::var("RS_GROUPS_CACHE_ENABLED") {
            match super::parse_flag(&enabled) {
                Some(flag) => self.enabled = flag,
                None => log::warn!("ignoring unknown RS_GROUPS_CACHE_ENABLED={}", enabled),
            }
        }
        if let Ok(backend) = env::var("RS_GROUPS_CACHE_BACKEND") {
            self.backend = backend;
        }
        if let Ok(ttl) = env::var("RS_GROUPS_CACHE_TTL") {
            if let Ok(ttl) = ttl.parse() {
                self.ttl_secs = ttl;
            }
        }
        if let Ok(policy) = env::var("RS_GROUPS_CACHE_INVALIDATION") {
            match policy.to_lowercase().as_str() {
                "kind" => self.invalidation = InvalidationPolicy::Kind,
                "group" => self.invalidation = InvalidationPolicy::Group,
                other => log::warn!("ignoring unknown RS_GROUPS_CACHE_INVALIDATION={}", other),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.backend.as_str() {
            "memory" | "none" => {}
            other => bail!("unknown cache backend '{}' (expected memory or none)", other),
        }
        if self.enabled && self.ttl_secs == 0 {
            bail!("cache ttl_secs must be greater than 0 when the cache is enabled");
        }
        Ok(())
    }
}
