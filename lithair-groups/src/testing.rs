//! Test fixtures shared by the unit tests

use crate::cache::{CacheBackend, CacheError, CacheKey, CacheTicket, FlushScope};
use crate::error::{Error, Result};
use crate::model::{EntityId, Group, GroupId, MemberRecord, RelationKind, Role, User};
use crate::store::{
    DeleteMode, GroupStore, MemoryStore, RecordSource, RelationStore, SyncChanges,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Group 1 "staff" holds role admin and users 100 (alice) and 101 (bob).
/// Group 2 "board" is empty. Roles 2 (editor) and 3 (viewer) and user 102
/// (carol) exist but are unattached
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.put_role(Role::new(1u64, "admin")).await;
    store.put_role(Role::new(2u64, "editor")).await;
    store.put_role(Role::new(3u64, "viewer")).await;
    store.put_user(User::new(100u64).with_name("alice")).await;
    store.put_user(User::new(101u64).with_name("bob")).await;
    store.put_user(User::new(102u64).with_name("carol")).await;
    store.put_group(Group::new(1u64, "staff")).await;
    store.put_group(Group::new(2u64, "board")).await;

    let staff = GroupId::from(1u64);
    store.add(&staff, &EntityId::from(1u64), RelationKind::Roles).await.unwrap();
    store.add(&staff, &EntityId::from(100u64), RelationKind::Users).await.unwrap();
    store.add(&staff, &EntityId::from(101u64), RelationKind::Users).await.unwrap();
    store
}

fn down() -> Error {
    Error::Store("connection refused".to_string())
}

/// Store whose every call fails
pub struct FailingStore;

#[async_trait::async_trait]
impl RelationStore for FailingStore {
    async fn add(&self, _: &GroupId, _: &EntityId, _: RelationKind) -> Result<bool> {
        Err(down())
    }

    async fn remove(&self, _: &GroupId, _: &EntityId, _: RelationKind) -> Result<bool> {
        Err(down())
    }

    async fn remove_all(&self, _: &GroupId, _: RelationKind) -> Result<usize> {
        Err(down())
    }

    async fn list(&self, _: &GroupId, _: RelationKind) -> Result<Vec<EntityId>> {
        Err(down())
    }

    async fn replace(&self, _: &GroupId, _: RelationKind, _: &[EntityId]) -> Result<SyncChanges> {
        Err(down())
    }

    async fn groups_for(&self, _: &EntityId, _: RelationKind) -> Result<Vec<GroupId>> {
        Err(down())
    }
}

#[async_trait::async_trait]
impl GroupStore for FailingStore {
    async fn find_group(&self, _: &GroupId) -> Result<Option<Group>> {
        Err(down())
    }

    async fn save_group(&self, _: &Group) -> Result<()> {
        Err(down())
    }

    async fn delete_group(&self, _: &GroupId, _: DeleteMode) -> Result<bool> {
        Err(down())
    }

    async fn restore_group(&self, _: &GroupId) -> Result<bool> {
        Err(down())
    }
}

#[async_trait::async_trait]
impl RecordSource for FailingStore {
    async fn fetch_record(&self, _: RelationKind, _: &EntityId) -> Result<Option<MemberRecord>> {
        Err(down())
    }
}

/// Wraps a [`MemoryStore`]. `add` succeeds `budget` times, then fails.
/// Counts `list` calls
pub struct FlakyStore {
    inner: MemoryStore,
    budget: AtomicUsize,
    lists: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore, budget: usize) -> Self {
        Self { inner, budget: AtomicUsize::new(budget), lists: AtomicUsize::new(0) }
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RelationStore for FlakyStore {
    async fn add(&self, group: &GroupId, entity: &EntityId, kind: RelationKind) -> Result<bool> {
        let spent = self
            .budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        match spent {
            Ok(_) => self.inner.add(group, entity, kind).await,
            Err(_) => Err(down()),
        }
    }

    async fn remove(&self, group: &GroupId, entity: &EntityId, kind: RelationKind) -> Result<bool> {
        self.inner.remove(group, entity, kind).await
    }

    async fn remove_all(&self, group: &GroupId, kind: RelationKind) -> Result<usize> {
        self.inner.remove_all(group, kind).await
    }

    async fn list(&self, group: &GroupId, kind: RelationKind) -> Result<Vec<EntityId>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(group, kind).await
    }

    async fn replace(
        &self,
        group: &GroupId,
        kind: RelationKind,
        entities: &[EntityId],
    ) -> Result<SyncChanges> {
        self.inner.replace(group, kind, entities).await
    }

    async fn groups_for(&self, entity: &EntityId, kind: RelationKind) -> Result<Vec<GroupId>> {
        self.inner.groups_for(entity, kind).await
    }
}

#[async_trait::async_trait]
impl GroupStore for FlakyStore {
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>> {
        self.inner.find_group(id).await
    }

    async fn save_group(&self, group: &Group) -> Result<()> {
        self.inner.save_group(group).await
    }

    async fn delete_group(&self, id: &GroupId, mode: DeleteMode) -> Result<bool> {
        self.inner.delete_group(id, mode).await
    }

    async fn restore_group(&self, id: &GroupId) -> Result<bool> {
        self.inner.restore_group(id).await
    }
}

#[async_trait::async_trait]
impl RecordSource for FlakyStore {
    async fn fetch_record(&self, kind: RelationKind, id: &EntityId) -> Result<Option<MemberRecord>> {
        self.inner.fetch_record(kind, id).await
    }
}

/// Wraps a [`MemoryStore`]. Once armed, the next `list` reads its result,
/// signals `reached` and parks until `release` is notified
pub struct GatedStore {
    inner: MemoryStore,
    armed: AtomicBool,
    pub reached: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            reached: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl RelationStore for GatedStore {
    async fn add(&self, group: &GroupId, entity: &EntityId, kind: RelationKind) -> Result<bool> {
        self.inner.add(group, entity, kind).await
    }

    async fn remove(&self, group: &GroupId, entity: &EntityId, kind: RelationKind) -> Result<bool> {
        self.inner.remove(group, entity, kind).await
    }

    async fn remove_all(&self, group: &GroupId, kind: RelationKind) -> Result<usize> {
        self.inner.remove_all(group, kind).await
    }

    async fn list(&self, group: &GroupId, kind: RelationKind) -> Result<Vec<EntityId>> {
        let ids = self.inner.list(group, kind).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.notify_one();
            self.release.notified().await;
        }
        Ok(ids)
    }

    async fn replace(
        &self,
        group: &GroupId,
        kind: RelationKind,
        entities: &[EntityId],
    ) -> Result<SyncChanges> {
        self.inner.replace(group, kind, entities).await
    }

    async fn groups_for(&self, entity: &EntityId, kind: RelationKind) -> Result<Vec<GroupId>> {
        self.inner.groups_for(entity, kind).await
    }
}

#[async_trait::async_trait]
impl GroupStore for GatedStore {
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>> {
        self.inner.find_group(id).await
    }

    async fn save_group(&self, group: &Group) -> Result<()> {
        self.inner.save_group(group).await
    }

    async fn delete_group(&self, id: &GroupId, mode: DeleteMode) -> Result<bool> {
        self.inner.delete_group(id, mode).await
    }

    async fn restore_group(&self, id: &GroupId) -> Result<bool> {
        self.inner.restore_group(id).await
    }
}

#[async_trait::async_trait]
impl RecordSource for GatedStore {
    async fn fetch_record(&self, kind: RelationKind, id: &EntityId) -> Result<Option<MemberRecord>> {
        self.inner.fetch_record(kind, id).await
    }
}

/// Cache backend that is always unreachable
pub struct FaultyCache;

impl CacheBackend for FaultyCache {
    fn name(&self) -> &str {
        "faulty"
    }

    fn get(&self, _: &CacheKey) -> std::result::Result<Option<Vec<MemberRecord>>, CacheError> {
        Err(CacheError::Unavailable("connection reset".to_string()))
    }

    fn ticket(&self, _: RelationKind) -> std::result::Result<CacheTicket, CacheError> {
        Err(CacheError::Unavailable("connection reset".to_string()))
    }

    fn put(
        &self,
        _: CacheKey,
        _: Vec<MemberRecord>,
        _: Duration,
        _: CacheTicket,
    ) -> std::result::Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection reset".to_string()))
    }

    fn flush(&self, _: &FlushScope) -> std::result::Result<usize, CacheError> {
        Err(CacheError::Unavailable("connection reset".to_string()))
    }

    fn len(&self) -> usize {
        0
    }
}
