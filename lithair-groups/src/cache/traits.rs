//! Core traits and types for membership caching

use crate::model::{EntityId, GroupId, MemberRecord, RelationKind};
use std::fmt;
use std::time::{Duration, Instant};

/// Whose membership view an entry holds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Roles or users of a group
    Group(GroupId),
    /// Groups of a principal (derived from the `group_user` table)
    Principal(EntityId),
}

/// Cache key: owner plus the relation kind the view is derived from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub owner: Owner,
    pub kind: RelationKind,
}

impl CacheKey {
    pub fn group(group: &GroupId, kind: RelationKind) -> Self {
        Self { owner: Owner::Group(group.clone()), kind }
    }

    pub fn principal(user: &EntityId) -> Self {
        Self { owner: Owner::Principal(user.clone()), kind: RelationKind::Users }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Owner::Group(id) => write!(f, "{}_for_group_{}", self.kind, id),
            Owner::Principal(id) => write!(f, "groups_for_user_{}", id),
        }
    }
}

/// A cached membership view with its expiry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Vec<MemberRecord>,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(value: Vec<MemberRecord>, ttl: Duration) -> Self {
        Self { value, created_at: Instant::now(), ttl }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Generation stamp taken before a loader runs
///
/// A value may only be stored if no flush of its kind happened since the
/// ticket was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket {
    pub kind: RelationKind,
    pub generation: u64,
}

/// Which entries a flush drops
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushScope {
    /// Every entry of the kind, all owners
    Kind(RelationKind),
    /// Entries of the kind owned by this group, plus every principal view
    /// of the kind
    Group { kind: RelationKind, group: GroupId },
}

impl FlushScope {
    pub fn kind(&self) -> RelationKind {
        match self {
            FlushScope::Kind(kind) | FlushScope::Group { kind, .. } => *kind,
        }
    }

    pub fn covers(&self, key: &CacheKey) -> bool {
        if key.kind != self.kind() {
            return false;
        }
        match self {
            FlushScope::Kind(_) => true,
            FlushScope::Group { group, .. } => match &key.owner {
                Owner::Group(owner) => owner == group,
                Owner::Principal(_) => true,
            },
        }
    }
}

/// Cache backend faults. Never surfaced to membership readers
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

impl From<CacheError> for crate::Error {
    fn from(err: CacheError) -> Self {
        crate::Error::CacheUnavailable(err.to_string())
    }
}

/// Storage behind the membership cache
///
/// Implementations must be safe for concurrent use.
pub trait CacheBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Whether entries can be grouped by tag and flushed. Backends that
    /// cannot are bypassed entirely
    fn supports_tags(&self) -> bool {
        true
    }

    /// Unexpired entry for the key
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<MemberRecord>>, CacheError>;

    /// Current generation for a kind
    fn ticket(&self, kind: RelationKind) -> Result<CacheTicket, CacheError>;

    /// Store unless a flush of the ticket's kind happened since it was
    /// issued. Returns whether the value was kept
    fn put(
        &self,
        key: CacheKey,
        value: Vec<MemberRecord>,
        ttl: Duration,
        ticket: CacheTicket,
    ) -> Result<bool, CacheError>;

    /// Drop matching entries and advance the kind's generation. Returns how
    /// many entries were dropped
    fn flush(&self, scope: &FlushScope) -> Result<usize, CacheError>;

    /// Number of live entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
