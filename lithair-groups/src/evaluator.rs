//! Membership checks
//!
//! `has_role`, `has_user` and `has_group` share one shape: a single value is
//! a linear scan of the cached view; a list is quantified with any/all
//! semantics, short-circuiting on the first decisive element.

use crate::cache::{CacheKey, MembershipCache};
use crate::error::Result;
use crate::model::{EntityId, GroupId, MemberRecord, RelationKind, Selection};
use crate::store::{GroupStore, MembershipBackend, RecordSource, RelationStore};
use std::future::Future;
use std::sync::Arc;

/// Evaluate `pred` over `items` with any (`require_all == false`) or all
/// semantics
///
/// Returns `require_all` when no element decides the outcome, so an empty
/// list is `false` under any and vacuously `true` under all.
pub fn quantify<I, P>(items: I, require_all: bool, mut pred: P) -> bool
where
    I: IntoIterator,
    P: FnMut(I::Item) -> bool,
{
    for item in items {
        let hit = pred(item);
        if hit && !require_all {
            return true;
        }
        if !hit && require_all {
            return false;
        }
    }
    require_all
}

/// Read-only membership queries backed by the membership cache
#[derive(Clone)]
pub struct MembershipEvaluator {
    store: Arc<dyn MembershipBackend>,
    cache: Arc<MembershipCache>,
}

impl MembershipEvaluator {
    pub fn new(store: Arc<dyn MembershipBackend>, cache: Arc<MembershipCache>) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &Arc<MembershipCache> {
        &self.cache
    }

    /// Roles of a group, as of the last refresh
    pub async fn cached_roles(&self, group: &GroupId) -> Result<Vec<MemberRecord>> {
        self.cached(group, RelationKind::Roles).await
    }

    /// Users of a group, as of the last refresh
    pub async fn cached_users(&self, group: &GroupId) -> Result<Vec<MemberRecord>> {
        self.cached(group, RelationKind::Users).await
    }

    /// Live (not soft-deleted) groups a user belongs to
    pub async fn cached_groups(&self, user: &EntityId) -> Result<Vec<MemberRecord>> {
        self.cache
            .remember(CacheKey::principal(user), || load_groups(self.store.as_ref(), user))
            .await
    }

    async fn cached(&self, group: &GroupId, kind: RelationKind) -> Result<Vec<MemberRecord>> {
        self.cache
            .remember(CacheKey::group(group, kind), || {
                load_related(self.store.as_ref(), group, kind)
            })
            .await
    }

    /// Whether the group has the role name(s)
    pub async fn has_role(
        &self,
        group: &GroupId,
        names: impl Into<Selection<String>>,
        require_all: bool,
    ) -> Result<bool> {
        check(names.into(), require_all, || self.cached_roles(group), |record, name: &String| {
            record.name.as_deref() == Some(name.as_str())
        })
        .await
    }

    /// Whether the group has the user id(s)
    pub async fn has_user(
        &self,
        group: &GroupId,
        users: impl Into<Selection<EntityId>>,
        require_all: bool,
    ) -> Result<bool> {
        check(users.into(), require_all, || self.cached_users(group), |record, id: &EntityId| {
            &record.id == id
        })
        .await
    }

    /// Whether the user belongs to the group name(s)
    pub async fn has_group(
        &self,
        user: &EntityId,
        names: impl Into<Selection<String>>,
        require_all: bool,
    ) -> Result<bool> {
        check(names.into(), require_all, || self.cached_groups(user), |record, name: &String| {
            record.name.as_deref() == Some(name.as_str())
        })
        .await
    }
}

async fn check<T, L, Fut, M>(
    selection: Selection<T>,
    require_all: bool,
    load: L,
    matches: M,
) -> Result<bool>
where
    L: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<MemberRecord>>>,
    M: Fn(&MemberRecord, &T) -> bool,
{
    // A single value ignores require_all
    let (wanted, require_all) = match selection {
        Selection::One(value) => (vec![value], false),
        Selection::Many(values) => (values, require_all),
    };
    if wanted.is_empty() {
        return Ok(require_all);
    }

    let members = load().await?;
    Ok(quantify(wanted, require_all, |value| members.iter().any(|record| matches(record, &value))))
}

async fn load_related(
    store: &dyn MembershipBackend,
    group: &GroupId,
    kind: RelationKind,
) -> Result<Vec<MemberRecord>> {
    let ids = store.list(group, kind).await?;
    let mut records = Vec::with_capacity(ids.len());
    for id in &ids {
        match store.fetch_record(kind, id).await? {
            Some(record) => records.push(record),
            None => log::debug!("{} {} of group {} has no record, skipped", kind, id, group),
        }
    }
    Ok(records)
}

async fn load_groups(store: &dyn MembershipBackend, user: &EntityId) -> Result<Vec<MemberRecord>> {
    let mut records = Vec::new();
    for id in store.groups_for(user, RelationKind::Users).await? {
        if let Some(group) = store.find_group(&id).await? {
            if !group.is_trashed() {
                records.push(MemberRecord::from(&group));
            }
        }
    }
    Ok(records)
}
