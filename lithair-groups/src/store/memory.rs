//! In-memory relation storage
//!
//! All tables live behind one `tokio::sync::RwLock`, so writes are
//! serialized and `replace` is atomic. Suitable for tests and single-process
//! deployments; data is lost on restart.

use super::{DeleteMode, GroupStore, RecordSource, RelationStore, SyncChanges};
use crate::error::{Error, Result};
use crate::model::{EntityId, Group, GroupId, MemberRecord, RelationKind, Role, User};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    groups: HashMap<GroupId, Group>,
    /// (group, kind) -> related ids, insertion ordered, no duplicates
    edges: HashMap<(GroupId, RelationKind), Vec<EntityId>>,
    roles: HashMap<EntityId, Role>,
    users: HashMap<EntityId, User>,
}

impl Tables {
    fn ensure_group(&self, group: &GroupId) -> Result<()> {
        if self.groups.contains_key(group) {
            Ok(())
        } else {
            Err(Error::group_not_found(group))
        }
    }
}

/// In-memory implementation of every store trait
///
/// # Example
///
/// ```ignore
/// use lithair_groups::store::MemoryStore;
/// use lithair_groups::{Group, Role};
///
/// let store = MemoryStore::new();
/// store.put_role(Role::new(1u64, "admin")).await;
/// store.put_group(Group::new(10u64, "staff")).await;
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a role record
    pub async fn put_role(&self, role: Role) {
        self.tables.write().await.roles.insert(role.id.clone(), role);
    }

    /// Register (or replace) a user record
    pub async fn put_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id.clone(), user);
    }

    /// Insert a group row without going through the lifecycle hooks
    pub async fn put_group(&self, group: Group) {
        self.tables.write().await.groups.insert(group.id.clone(), group);
    }

    /// Total number of stored pairs, all kinds included
    pub async fn edge_count(&self) -> usize {
        self.tables.read().await.edges.values().map(Vec::len).sum()
    }
}

#[async_trait::async_trait]
impl RelationStore for MemoryStore {
    async fn add(&self, group: &GroupId, entity: &EntityId, kind: RelationKind) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.ensure_group(group)?;

        let related = tables.edges.entry((group.clone(), kind)).or_default();
        if related.contains(entity) {
            return Ok(false);
        }
        related.push(entity.clone());
        Ok(true)
    }

    async fn remove(
        &self,
        group: &GroupId,
        entity: &EntityId,
        kind: RelationKind,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.ensure_group(group)?;

        let Some(related) = tables.edges.get_mut(&(group.clone(), kind)) else {
            return Ok(false);
        };
        let before = related.len();
        related.retain(|id| id != entity);
        Ok(related.len() != before)
    }

    async fn remove_all(&self, group: &GroupId, kind: RelationKind) -> Result<usize> {
        let mut tables = self.tables.write().await;
        tables.ensure_group(group)?;

        Ok(tables.edges.remove(&(group.clone(), kind)).map(|related| related.len()).unwrap_or(0))
    }

    async fn list(&self, group: &GroupId, kind: RelationKind) -> Result<Vec<EntityId>> {
        let tables = self.tables.read().await;
        tables.ensure_group(group)?;

        Ok(tables.edges.get(&(group.clone(), kind)).cloned().unwrap_or_default())
    }

    async fn replace(
        &self,
        group: &GroupId,
        kind: RelationKind,
        entities: &[EntityId],
    ) -> Result<SyncChanges> {
        let mut tables = self.tables.write().await;
        tables.ensure_group(group)?;

        let related = tables.edges.entry((group.clone(), kind)).or_default();
        let mut changes = SyncChanges::default();

        related.retain(|id| {
            let keep = entities.contains(id);
            if !keep {
                changes.detached.push(id.clone());
            }
            keep
        });
        for id in entities {
            if !related.contains(id) {
                related.push(id.clone());
                changes.attached.push(id.clone());
            }
        }

        Ok(changes)
    }

    async fn groups_for(&self, entity: &EntityId, kind: RelationKind) -> Result<Vec<GroupId>> {
        let tables = self.tables.read().await;
        let mut groups: Vec<GroupId> = tables
            .edges
            .iter()
            .filter(|((_, k), related)| *k == kind && related.contains(entity))
            .map(|((group, _), _)| group.clone())
            .collect();
        groups.sort();
        Ok(groups)
    }
}

#[async_trait::async_trait]
impl GroupStore for MemoryStore {
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>> {
        Ok(self.tables.read().await.groups.get(id).cloned())
    }

    async fn save_group(&self, group: &Group) -> Result<()> {
        self.tables.write().await.groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn delete_group(&self, id: &GroupId, mode: DeleteMode) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match mode {
            DeleteMode::Soft => match tables.groups.get_mut(id) {
                Some(group) if group.deleted_at.is_none() => {
                    group.deleted_at = Some(Utc::now());
                    Ok(true)
                }
                _ => Ok(false),
            },
            DeleteMode::Hard => {
                if tables.groups.remove(id).is_none() {
                    return Ok(false);
                }
                for kind in RelationKind::ALL {
                    tables.edges.remove(&(id.clone(), kind));
                }
                Ok(true)
            }
        }
    }

    async fn restore_group(&self, id: &GroupId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(id) {
            Some(group) if group.deleted_at.is_some() => {
                group.deleted_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for MemoryStore {
    async fn fetch_record(
        &self,
        kind: RelationKind,
        id: &EntityId,
    ) -> Result<Option<MemberRecord>> {
        let tables = self.tables.read().await;
        Ok(match kind {
            RelationKind::Roles => tables.roles.get(id).map(MemberRecord::from),
            RelationKind::Users => tables.users.get(id).map(MemberRecord::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_group() -> (MemoryStore, GroupId) {
        let store = MemoryStore::new();
        let group = GroupId::from(1u64);
        store.put_group(Group::new(1u64, "staff")).await;
        (store, group)
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (store, group) = store_with_group().await;
        let role = EntityId::from(5u64);

        assert!(store.add(&group, &role, RelationKind::Roles).await.unwrap());
        assert!(!store.add(&group, &role, RelationKind::Roles).await.unwrap());

        assert_eq!(store.list(&group, RelationKind::Roles).await.unwrap(), vec![role]);
        assert!(store.list(&group, RelationKind::Users).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_pair_is_noop() {
        let (store, group) = store_with_group().await;

        assert!(!store.remove(&group, &EntityId::from(9u64), RelationKind::Users).await.unwrap());
        assert_eq!(store.remove_all(&group, RelationKind::Users).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let store = MemoryStore::new();
        let missing = GroupId::from("ghost");

        let err = store.list(&missing, RelationKind::Roles).await.unwrap_err();
        assert!(err.is_not_found());
        let err = store.add(&missing, &EntityId::from(1u64), RelationKind::Roles).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_replace_reports_changes_and_keeps_order() {
        let (store, group) = store_with_group().await;
        for id in [1u64, 2, 3] {
            store.add(&group, &id.into(), RelationKind::Users).await.unwrap();
        }

        let changes = store
            .replace(&group, RelationKind::Users, &[3u64.into(), 4u64.into(), 1u64.into()])
            .await
            .unwrap();

        assert_eq!(changes.detached, vec![EntityId::from(2u64)]);
        assert_eq!(changes.attached, vec![EntityId::from(4u64)]);
        assert_eq!(
            store.list(&group, RelationKind::Users).await.unwrap(),
            vec![EntityId::from(1u64), EntityId::from(3u64), EntityId::from(4u64)]
        );
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_relations_hard_delete_cascades() {
        let (store, group) = store_with_group().await;
        store.add(&group, &7u64.into(), RelationKind::Roles).await.unwrap();

        assert!(store.delete_group(&group, DeleteMode::Soft).await.unwrap());
        assert!(!store.delete_group(&group, DeleteMode::Soft).await.unwrap());
        assert_eq!(store.list(&group, RelationKind::Roles).await.unwrap().len(), 1);
        assert!(store.find_group(&group).await.unwrap().unwrap().is_trashed());

        assert!(store.restore_group(&group).await.unwrap());
        assert!(!store.find_group(&group).await.unwrap().unwrap().is_trashed());

        assert!(store.delete_group(&group, DeleteMode::Hard).await.unwrap());
        assert_eq!(store.edge_count().await, 0);
        assert!(store.list(&group, RelationKind::Roles).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_groups_for_reverse_lookup() {
        let store = MemoryStore::new();
        store.put_group(Group::new(1u64, "a")).await;
        store.put_group(Group::new(2u64, "b")).await;
        let user = EntityId::from(42u64);
        store.add(&2u64.into(), &user, RelationKind::Users).await.unwrap();
        store.add(&1u64.into(), &user, RelationKind::Users).await.unwrap();
        store.add(&1u64.into(), &user, RelationKind::Roles).await.unwrap();

        assert_eq!(
            store.groups_for(&user, RelationKind::Users).await.unwrap(),
            vec![GroupId::from(1u64), GroupId::from(2u64)]
        );
    }

    #[tokio::test]
    async fn test_concurrent_adds_keep_pairs_unique() {
        let (store, group) = store_with_group().await;
        let mut handles = vec![];

        for i in 0..20u64 {
            let store = store.clone();
            let group = group.clone();
            handles.push(tokio::spawn(async move {
                store.add(&group, &(i % 5).into(), RelationKind::Users).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.list(&group, RelationKind::Users).await.unwrap().len(), 5);
    }
}
