use cucumber::World as CucumberWorld;
use hyper::StatusCode;
use lithair_groups::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Shared scenario state: one in-memory store with a manager and cache on top
#[derive(CucumberWorld)]
pub struct MembershipWorld {
    pub store: MemoryStore,
    pub manager: GroupManager,
    pub last_status: Option<StatusCode>,
    pub last_error: Option<Error>,
}

impl std::fmt::Debug for MembershipWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipWorld")
            .field("store", &"<MemoryStore>")
            .field("cache", self.manager.cache())
            .field("soft_deletes", &self.manager.soft_deletes())
            .field("last_status", &self.last_status)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl Default for MembershipWorld {
    fn default() -> Self {
        let store = MemoryStore::new();
        let manager = GroupManager::new(Arc::new(store.clone()), Arc::new(MembershipCache::default()));
        Self { store, manager, last_status: None, last_error: None }
    }
}

impl MembershipWorld {
    /// Groups and roles are keyed by their names in scenarios
    pub fn group(name: &str) -> GroupId {
        GroupId::from(name)
    }

    pub fn role_ids(names: &str) -> Vec<EntityId> {
        split(names).into_iter().map(EntityId::from).collect()
    }

    pub fn evaluator(&self) -> &MembershipEvaluator {
        self.manager.evaluator()
    }

    pub fn set_soft_deletes(&mut self, enabled: bool) {
        self.manager = self.manager.clone().with_soft_deletes(enabled);
    }

    pub async fn create_group(&self, name: &str) {
        self.manager
            .save_group(&Group::new(Self::group(name), name))
            .await
            .expect("Failed to save group");
    }

    pub async fn listed(&self, group: &str, kind: RelationKind) -> HashSet<EntityId> {
        self.manager
            .list(&Self::group(group), kind)
            .await
            .expect("Failed to list relations")
            .into_iter()
            .collect()
    }
}

/// Comma-separated list, blanks dropped
pub fn split(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
