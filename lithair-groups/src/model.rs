//! Entities, identifiers and argument shapes shared by every layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a User, Role or Group row
///
/// Rows keyed by integers and rows keyed by strings (UUIDs, slugs) are both
/// supported. Uniqueness is the backing store's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(u64),
    Str(String),
}

/// Group identifiers are plain entity identifiers
pub type GroupId = EntityId;

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{}", id),
            EntityId::Str(id) => f.write_str(id),
        }
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        EntityId::Int(id)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId::Int(id as u64)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Str(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Str(id)
    }
}

/// Which join table a membership query or mutation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Group ↔ Role (`role_group` table)
    Roles,
    /// Group ↔ User (`group_user` table)
    Users,
}

impl RelationKind {
    pub const ALL: [RelationKind; 2] = [RelationKind::Roles, RelationKind::Users];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Roles => "roles",
            RelationKind::Users => "users",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            RelationKind::Roles => 0,
            RelationKind::Users => 1,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Set when the group has been soft-deleted
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), deleted_at: None }
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A role row. Only `id` and `name` matter here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: EntityId,
    pub name: String,
}

impl Role {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// A user row. Only `id` matters here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self { id: id.into(), name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Denormalized related record, as materialized in the membership cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: EntityId,
    pub name: Option<String>,
}

impl From<&Role> for MemberRecord {
    fn from(role: &Role) -> Self {
        Self { id: role.id.clone(), name: Some(role.name.clone()) }
    }
}

impl From<&User> for MemberRecord {
    fn from(user: &User) -> Self {
        Self { id: user.id.clone(), name: user.name.clone() }
    }
}

impl From<&Group> for MemberRecord {
    fn from(group: &Group) -> Self {
        Self { id: group.id.clone(), name: Some(group.name.clone()) }
    }
}

/// Anything that resolves to a canonical identifier
pub trait Keyed {
    fn key(&self) -> EntityId;
}

impl Keyed for EntityId {
    fn key(&self) -> EntityId {
        self.clone()
    }
}

impl Keyed for Role {
    fn key(&self) -> EntityId {
        self.id.clone()
    }
}

impl Keyed for User {
    fn key(&self) -> EntityId {
        self.id.clone()
    }
}

impl Keyed for Group {
    fn key(&self) -> EntityId {
        self.id.clone()
    }
}

impl Keyed for MemberRecord {
    fn key(&self) -> EntityId {
        self.id.clone()
    }
}

/// Attach/detach argument: a key, a keyed record, or a (nested) list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Key(EntityId),
    Many(Vec<Target>),
}

impl Target {
    /// Flatten into identifiers, depth first, keeping argument order
    pub fn into_keys(self) -> Vec<EntityId> {
        let mut keys = Vec::new();
        self.collect_into(&mut keys);
        keys
    }

    fn collect_into(self, keys: &mut Vec<EntityId>) {
        match self {
            Target::Key(id) => keys.push(id),
            Target::Many(items) => {
                for item in items {
                    item.collect_into(keys);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Target::Key(_) => false,
            Target::Many(items) => items.iter().all(Target::is_empty),
        }
    }
}

impl From<EntityId> for Target {
    fn from(id: EntityId) -> Self {
        Target::Key(id)
    }
}

impl From<u64> for Target {
    fn from(id: u64) -> Self {
        Target::Key(id.into())
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Target::Key(id.into())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Target::Key(id.into())
    }
}

impl<K: Keyed> From<&K> for Target {
    fn from(record: &K) -> Self {
        Target::Key(record.key())
    }
}

impl<T: Into<Target>> From<Vec<T>> for Target {
    fn from(items: Vec<T>) -> Self {
        Target::Many(items.into_iter().map(Into::into).collect())
    }
}

/// Single-or-list query argument used by the membership checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Selection<T> {
    pub fn one(value: impl Into<T>) -> Self {
        Selection::One(value.into())
    }

    pub fn many<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
    {
        Selection::Many(values.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Selection<String> {
    fn from(name: &str) -> Self {
        Selection::One(name.to_string())
    }
}

impl From<String> for Selection<String> {
    fn from(name: String) -> Self {
        Selection::One(name)
    }
}

impl From<Vec<&str>> for Selection<String> {
    fn from(names: Vec<&str>) -> Self {
        Selection::many(names)
    }
}

impl From<Vec<String>> for Selection<String> {
    fn from(names: Vec<String>) -> Self {
        Selection::Many(names)
    }
}

impl From<&[&str]> for Selection<String> {
    fn from(names: &[&str]) -> Self {
        Selection::many(names.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Selection<String> {
    fn from(names: [&str; N]) -> Self {
        Selection::many(names)
    }
}

impl From<EntityId> for Selection<EntityId> {
    fn from(id: EntityId) -> Self {
        Selection::One(id)
    }
}

impl From<u64> for Selection<EntityId> {
    fn from(id: u64) -> Self {
        Selection::One(id.into())
    }
}

impl From<&str> for Selection<EntityId> {
    fn from(id: &str) -> Self {
        Selection::One(id.into())
    }
}

impl From<Vec<u64>> for Selection<EntityId> {
    fn from(ids: Vec<u64>) -> Self {
        Selection::many(ids)
    }
}

impl From<Vec<EntityId>> for Selection<EntityId> {
    fn from(ids: Vec<EntityId>) -> Self {
        Selection::Many(ids)
    }
}

impl<const N: usize> From<[u64; N]> for Selection<EntityId> {
    fn from(ids: [u64; N]) -> Self {
        Selection::many(ids)
    }
}
