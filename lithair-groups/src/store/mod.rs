//! Relation storage traits
//!
//! The engine never talks to a database directly. It consumes three
//! collaborators, usually implemented by one persistence adapter:
//!
//! - [`RelationStore`] - join table CRUD (`role_group`, `group_user`)
//! - [`GroupStore`] - group rows, including soft delete and restore
//! - [`RecordSource`] - denormalized role / user records for cache fills
//!
//! [`MemoryStore`] implements all three and is what the tests run against.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::model::{EntityId, Group, GroupId, MemberRecord, RelationKind};

/// Outcome of an atomic `replace`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncChanges {
    pub attached: Vec<EntityId>,
    pub detached: Vec<EntityId>,
}

impl SyncChanges {
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

/// How a group row is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Mark the row inactive, keep its relations
    Soft,
    /// Remove the row and cascade to its relations
    Hard,
}

/// Join table access keyed by group and relation kind
///
/// Every call fails with [`crate::Error::NotFound`] when the group row does
/// not exist. Writes must be complete when the returned future resolves.
#[async_trait::async_trait]
pub trait RelationStore: Send + Sync {
    /// Insert the pair. Returns `false` when it already existed
    async fn add(&self, group: &GroupId, entity: &EntityId, kind: RelationKind) -> Result<bool>;

    /// Delete the pair. Returns `false` when it did not exist
    async fn remove(&self, group: &GroupId, entity: &EntityId, kind: RelationKind)
        -> Result<bool>;

    /// Delete every pair of this kind for the group, returning how many went
    async fn remove_all(&self, group: &GroupId, kind: RelationKind) -> Result<usize>;

    /// Related ids in insertion order
    async fn list(&self, group: &GroupId, kind: RelationKind) -> Result<Vec<EntityId>>;

    /// Make the related set equal to `entities` in one critical section
    async fn replace(
        &self,
        group: &GroupId,
        kind: RelationKind,
        entities: &[EntityId],
    ) -> Result<SyncChanges>;

    /// Reverse lookup: groups holding `entity` through relation `kind`
    async fn groups_for(&self, entity: &EntityId, kind: RelationKind) -> Result<Vec<GroupId>>;

    /// Whether the pair exists
    async fn contains(
        &self,
        group: &GroupId,
        entity: &EntityId,
        kind: RelationKind,
    ) -> Result<bool> {
        Ok(self.list(group, kind).await?.contains(entity))
    }
}

/// Group rows
#[async_trait::async_trait]
pub trait GroupStore: Send + Sync {
    /// Fetch a row, soft-deleted ones included
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>>;

    /// Insert or update
    async fn save_group(&self, group: &Group) -> Result<()>;

    /// Returns `false` when there was nothing to delete
    async fn delete_group(&self, id: &GroupId, mode: DeleteMode) -> Result<bool>;

    /// Undo a soft delete. Returns `false` when the row was not trashed
    async fn restore_group(&self, id: &GroupId) -> Result<bool>;
}

/// Lookup of related records for cache materialization
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the record behind an id of the given kind, if it exists
    async fn fetch_record(&self, kind: RelationKind, id: &EntityId)
        -> Result<Option<MemberRecord>>;
}

/// Everything the engine needs from persistence, as one trait object
pub trait MembershipBackend: RelationStore + GroupStore + RecordSource {}

impl<T: RelationStore + GroupStore + RecordSource> MembershipBackend for T {}
