//! Lithair Groups
//!
//! Group, role and user membership for Lithair applications.
//!
//! # Overview
//!
//! Groups own a set of users and a set of roles through two join tables.
//! This crate manages those relations and answers membership questions
//! against a tag-invalidated cache that never serves a view older than the
//! last mutation of its relation kind.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lithair_groups::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GroupsConfig::load()?;
//!     init_logging(&config.logging);
//!
//!     let store = MemoryStore::new();
//!     store.put_role(Role::new(1u64, "admin")).await;
//!
//!     let manager = GroupManager::from_config(Arc::new(store), &config);
//!     let staff = Group::new(7u64, "staff");
//!     manager.save_group(&staff).await?;
//!     manager.attach_role(&staff.id, 1u64).await?;
//!
//!     assert!(manager.evaluator().has_role(&staff.id, "admin", false).await?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`store`] - Relation storage traits and the in-memory store
//! - [`cache`] - Membership cache with kind-tagged invalidation
//! - [`evaluator`] - `has_role` / `has_user` / `has_group`
//! - [`manager`] - attach / detach / sync and group lifecycle
//! - [`guard`] - 403 guard for HTTP requests
//! - [`config`] - TOML + environment configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod guard;
pub mod logging;
pub mod manager;
pub mod model;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use model::{EntityId, Group, GroupId, Keyed, MemberRecord, RelationKind, Role, Selection, Target, User};

pub mod prelude {
    pub use crate::cache::{InvalidationPolicy, MembershipCache};
    pub use crate::config::GroupsConfig;
    pub use crate::error::{Error, Result};
    pub use crate::evaluator::MembershipEvaluator;
    pub use crate::guard::{GroupGuard, GuardResult, Principal, PrincipalResolver};
    pub use crate::logging::init_logging;
    pub use crate::manager::GroupManager;
    pub use crate::model::{EntityId, Group, GroupId, Keyed, MemberRecord, RelationKind, Role, Selection, Target, User};
    pub use crate::store::{GroupStore, MemoryStore, MembershipBackend, RecordSource, RelationStore};
}
