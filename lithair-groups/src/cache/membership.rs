//! Read-through membership cache
//!
//! Wraps a [`CacheBackend`] with the `remember` / flush discipline used by
//! the evaluator and the mutation facade. Backend faults are logged and
//! turned into direct store reads; they never fail a request.

use super::none::NoCache;
use super::tagged::TaggedMemoryCache;
use super::traits::{CacheBackend, CacheKey, FlushScope};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::model::{GroupId, MemberRecord, RelationKind};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default time-to-live of a cached membership view
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// How much a mutation invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationPolicy {
    /// Every entry of the mutated kind, across all groups
    #[default]
    Kind,
    /// Only the mutated group's entries (plus principal views of the kind)
    Group,
}

pub struct MembershipCache {
    backend: Arc<dyn CacheBackend>,
    ttl: Duration,
    policy: InvalidationPolicy,
    enabled: bool,
}

impl MembershipCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend, ttl: DEFAULT_TTL, policy: InvalidationPolicy::Kind, enabled: true }
    }

    /// Cache that always reads through to the store
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::new(Arc::new(NoCache)) }
    }

    /// Build from configuration, picking the backend by name
    pub fn from_config(config: &CacheConfig) -> Self {
        let backend: Arc<dyn CacheBackend> = match config.backend.as_str() {
            "none" => Arc::new(NoCache),
            _ => Arc::new(TaggedMemoryCache::new()),
        };
        Self {
            backend,
            ttl: Duration::from_secs(config.ttl_secs),
            policy: config.invalidation,
            enabled: config.enabled,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_policy(mut self, policy: InvalidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn policy(&self) -> InvalidationPolicy {
        self.policy
    }

    /// Whether reads are served from the backend at all
    pub fn is_active(&self) -> bool {
        self.enabled && self.backend.supports_tags()
    }

    /// Return the cached view for `key`, or run `loader` and cache its result
    ///
    /// Loader errors propagate. Backend errors do not: the loader result is
    /// returned uncached.
    pub async fn remember<F, Fut>(&self, key: CacheKey, loader: F) -> Result<Vec<MemberRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<MemberRecord>>>,
    {
        if !self.is_active() {
            return loader().await;
        }

        match self.backend.get(&key) {
            Ok(Some(value)) => {
                log::debug!("cache hit: {}", key);
                return Ok(value);
            }
            Ok(None) => log::debug!("cache miss: {}", key),
            Err(err) => {
                log::warn!("{} cache read failed for {}, reading store: {}", self.backend.name(), key, err);
                return loader().await;
            }
        }

        let ticket = match self.backend.ticket(key.kind) {
            Ok(ticket) => ticket,
            Err(err) => {
                log::warn!("{} cache unavailable for {}, reading store: {}", self.backend.name(), key, err);
                return loader().await;
            }
        };

        let value = loader().await?;

        match self.backend.put(key.clone(), value.clone(), self.ttl, ticket) {
            Ok(true) => {}
            Ok(false) => log::debug!("discarded {}: invalidated while loading", key),
            Err(err) => log::warn!("{} cache write failed for {}: {}", self.backend.name(), key, err),
        }

        Ok(value)
    }

    /// Invalidate after a mutation of `kind` on `group`, following the policy
    pub fn invalidate(&self, kind: RelationKind, group: &GroupId) {
        let scope = match self.policy {
            InvalidationPolicy::Kind => FlushScope::Kind(kind),
            InvalidationPolicy::Group => FlushScope::Group { kind, group: group.clone() },
        };
        self.flush(&scope);
    }

    /// Invalidate every entry of `kind` regardless of policy
    pub fn invalidate_kind(&self, kind: RelationKind) {
        self.flush(&FlushScope::Kind(kind));
    }

    fn flush(&self, scope: &FlushScope) {
        match self.backend.flush(scope) {
            Ok(dropped) => log::debug!("flushed {} cached {} views ({:?})", dropped, scope.kind(), scope),
            Err(err) => log::warn!(
                "{} cache flush failed for {:?}, stale entries live until TTL: {}",
                self.backend.name(),
                scope,
                err
            ),
        }
    }
}

impl std::fmt::Debug for MembershipCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipCache")
            .field("backend", &self.backend.name())
            .field("ttl", &self.ttl)
            .field("policy", &self.policy)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Default for MembershipCache {
    fn default() -> Self {
        Self::new(Arc::new(TaggedMemoryCache::new()))
    }
}
