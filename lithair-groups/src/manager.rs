//! Relation mutations and group lifecycle
//!
//! Every mutation writes to the store first and invalidates the cached views
//! of the touched relation kind before returning, so the next membership
//! check observes the new state. Invalidation also runs when a write fails
//! part-way through a list, since earlier elements may already be stored.

use crate::cache::MembershipCache;
use crate::config::{GroupsConfig, TablesConfig};
use crate::error::Result;
use crate::evaluator::MembershipEvaluator;
use crate::model::{EntityId, Group, GroupId, RelationKind, Target};
use crate::store::{DeleteMode, GroupStore, MembershipBackend, RelationStore, SyncChanges};
use std::sync::Arc;

/// Mutation facade over the relation store and the membership cache
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let manager = GroupManager::new(store, Arc::new(MembershipCache::default()));
///
/// manager.attach_roles(&group, vec![1u64, 2]).await?;
/// assert!(manager.evaluator().has_role(&group, ["admin", "editor"], true).await?);
/// ```
#[derive(Clone)]
pub struct GroupManager {
    store: Arc<dyn MembershipBackend>,
    cache: Arc<MembershipCache>,
    evaluator: MembershipEvaluator,
    tables: TablesConfig,
    soft_deletes: bool,
}

impl GroupManager {
    pub fn new(store: Arc<dyn MembershipBackend>, cache: Arc<MembershipCache>) -> Self {
        let evaluator = MembershipEvaluator::new(store.clone(), cache.clone());
        Self { store, cache, evaluator, tables: TablesConfig::default(), soft_deletes: false }
    }

    /// Build the cache and the soft-delete behavior from configuration
    pub fn from_config(store: Arc<dyn MembershipBackend>, config: &GroupsConfig) -> Self {
        let cache = Arc::new(MembershipCache::from_config(&config.cache));
        Self::new(store, cache)
            .with_tables(config.tables.clone())
            .with_soft_deletes(config.groups.soft_deletes)
    }

    /// Whether the group model is soft-deletable
    pub fn with_soft_deletes(mut self, soft_deletes: bool) -> Self {
        self.soft_deletes = soft_deletes;
        self
    }

    pub fn with_tables(mut self, tables: TablesConfig) -> Self {
        self.tables = tables;
        self
    }

    pub fn evaluator(&self) -> &MembershipEvaluator {
        &self.evaluator
    }

    pub fn cache(&self) -> &Arc<MembershipCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn MembershipBackend> {
        &self.store
    }

    pub fn soft_deletes(&self) -> bool {
        self.soft_deletes
    }

    /// Related ids straight from the store, bypassing the cache
    pub async fn list(&self, group: &GroupId, kind: RelationKind) -> Result<Vec<EntityId>> {
        self.store.list(group, kind).await
    }

    // ------------------------------------------------------------------
    // Relation mutations
    // ------------------------------------------------------------------

    /// Attach one or more entities. Returns how many pairs were new
    pub async fn attach(
        &self,
        group: &GroupId,
        entity: impl Into<Target>,
        kind: RelationKind,
    ) -> Result<usize> {
        let keys = entity.into().into_keys();
        let mut attached = 0;
        let mut outcome = Ok(());

        for key in &keys {
            match self.store.add(group, key, kind).await {
                Ok(true) => attached += 1,
                Ok(false) => {}
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        self.cache.invalidate(kind, group);

        outcome?;
        log::debug!(
            "attached {} of {} {} to group {} ({})",
            attached,
            keys.len(),
            kind,
            group,
            self.tables.join_table(kind)
        );
        Ok(attached)
    }

    /// Detach entities, or every current member of the kind when `entity`
    /// is `None` or an empty list. Returns how many pairs were removed
    pub async fn detach(
        &self,
        group: &GroupId,
        entity: Option<Target>,
        kind: RelationKind,
    ) -> Result<usize> {
        let keys = match entity {
            Some(target) if !target.is_empty() => target.into_keys(),
            _ => return self.detach_all(group, kind).await,
        };
        let mut detached = 0;
        let mut outcome = Ok(());

        for key in &keys {
            match self.store.remove(group, key, kind).await {
                Ok(true) => detached += 1,
                Ok(false) => {}
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        self.cache.invalidate(kind, group);

        outcome?;
        log::debug!(
            "detached {} {} from group {} ({})",
            detached,
            kind,
            group,
            self.tables.join_table(kind)
        );
        Ok(detached)
    }

    async fn detach_all(&self, group: &GroupId, kind: RelationKind) -> Result<usize> {
        let result = self.store.remove_all(group, kind).await;
        self.cache.invalidate(kind, group);

        let detached = result?;
        log::debug!(
            "detached all {} {} from group {} ({})",
            detached,
            kind,
            group,
            self.tables.join_table(kind)
        );
        Ok(detached)
    }

    /// Make the related set exactly `entities`. An empty set detaches all
    pub async fn sync(
        &self,
        group: &GroupId,
        kind: RelationKind,
        entities: impl Into<Target>,
    ) -> Result<SyncChanges> {
        let keys = entities.into().into_keys();
        let result = self.store.replace(group, kind, &keys).await;
        self.cache.invalidate(kind, group);

        let changes = result?;
        log::debug!(
            "synced {} of group {}: +{} -{}",
            kind,
            group,
            changes.attached.len(),
            changes.detached.len()
        );
        Ok(changes)
    }

    pub async fn attach_role(&self, group: &GroupId, role: impl Into<Target>) -> Result<usize> {
        self.attach(group, role, RelationKind::Roles).await
    }

    pub async fn attach_roles<T: Into<Target>>(&self, group: &GroupId, roles: Vec<T>) -> Result<usize> {
        self.attach(group, roles, RelationKind::Roles).await
    }

    pub async fn attach_user(&self, group: &GroupId, user: impl Into<Target>) -> Result<usize> {
        self.attach(group, user, RelationKind::Users).await
    }

    pub async fn attach_users<T: Into<Target>>(&self, group: &GroupId, users: Vec<T>) -> Result<usize> {
        self.attach(group, users, RelationKind::Users).await
    }

    pub async fn detach_role(&self, group: &GroupId, role: impl Into<Target>) -> Result<usize> {
        self.detach(group, Some(role.into()), RelationKind::Roles).await
    }

    /// Detach the given roles, or all roles when `roles` is `None` or empty
    pub async fn detach_roles<T: Into<Target>>(
        &self,
        group: &GroupId,
        roles: Option<Vec<T>>,
    ) -> Result<usize> {
        self.detach(group, roles.map(Target::from), RelationKind::Roles).await
    }

    pub async fn detach_user(&self, group: &GroupId, user: impl Into<Target>) -> Result<usize> {
        self.detach(group, Some(user.into()), RelationKind::Users).await
    }

    /// Detach the given users, or all users when `users` is `None` or empty
    pub async fn detach_users<T: Into<Target>>(
        &self,
        group: &GroupId,
        users: Option<Vec<T>>,
    ) -> Result<usize> {
        self.detach(group, users.map(Target::from), RelationKind::Users).await
    }

    /// Replace the group's roles. An empty list detaches them all
    pub async fn save_roles(&self, group: &GroupId, roles: impl Into<Target>) -> Result<SyncChanges> {
        self.sync(group, RelationKind::Roles, roles).await
    }

    /// Replace the group's users. An empty list detaches them all
    pub async fn save_users(&self, group: &GroupId, users: impl Into<Target>) -> Result<SyncChanges> {
        self.sync(group, RelationKind::Users, users).await
    }

    // ------------------------------------------------------------------
    // Lifecycle hooks, called by the persistence layer
    // ------------------------------------------------------------------

    fn invalidate_group(&self, group: &Group) {
        for kind in RelationKind::ALL {
            self.cache.invalidate(kind, &group.id);
        }
    }

    /// After any insert or update of the group row
    pub fn on_group_saved(&self, group: &Group) {
        self.invalidate_group(group);
    }

    /// After a soft or hard delete of the group row
    pub fn on_group_deleted(&self, group: &Group) {
        self.invalidate_group(group);
    }

    /// After a soft delete was undone
    pub fn on_group_restored(&self, group: &Group) {
        self.invalidate_group(group);
    }

    /// Before the group row is deleted. Groups that cannot be soft-deleted
    /// lose their users and roles here so no orphaned pairs remain
    pub async fn on_group_deleting(&self, group: &Group) -> Result<()> {
        if self.soft_deletes {
            return Ok(());
        }
        self.detach_all(&group.id, RelationKind::Users).await?;
        self.detach_all(&group.id, RelationKind::Roles).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Group persistence with hooks applied
    // ------------------------------------------------------------------

    /// Insert or update a group row
    pub async fn save_group(&self, group: &Group) -> Result<()> {
        self.store.save_group(group).await?;
        log::info!("saved group {} ({})", group.id, group.name);
        self.on_group_saved(group);
        Ok(())
    }

    /// Delete a group: soft when the model supports it, hard otherwise
    ///
    /// Returns `false` when there was nothing to delete.
    pub async fn delete_group(&self, id: &GroupId) -> Result<bool> {
        let mode = if self.soft_deletes { DeleteMode::Soft } else { DeleteMode::Hard };
        self.remove_group(id, mode).await
    }

    /// Hard-delete a group even if the model supports soft deletes. The
    /// store cascades the remaining pairs
    pub async fn force_delete_group(&self, id: &GroupId) -> Result<bool> {
        self.remove_group(id, DeleteMode::Hard).await
    }

    async fn remove_group(&self, id: &GroupId, mode: DeleteMode) -> Result<bool> {
        let Some(group) = self.store.find_group(id).await? else {
            return Ok(false);
        };

        self.on_group_deleting(&group).await?;
        let deleted = self.store.delete_group(id, mode).await?;
        if deleted {
            log::info!("deleted group {} ({:?})", id, mode);
            self.on_group_deleted(&group);
        }
        Ok(deleted)
    }

    /// Undo a soft delete. Returns `false` when the group was not trashed
    pub async fn restore_group(&self, id: &GroupId) -> Result<bool> {
        let Some(group) = self.store.find_group(id).await? else {
            return Ok(false);
        };

        let restored = self.store.restore_group(id).await?;
        if restored {
            log::info!("restored group {}", id);
            self.on_group_restored(&group);
        }
        Ok(restored)
    }
}
