//! Membership caching
//!
//! Cached views are keyed by owner and relation kind and tagged by the kind,
//! so a mutation of the `role_group` table flushes every roles view while
//! leaving users views alone.
//!
//! - [`TaggedMemoryCache`] - process-local backend (default)
//! - [`NoCache`] - backend without tag support, disables caching
//! - [`MembershipCache`] - read-through wrapper with fault fallback

pub mod membership;
pub mod none;
pub mod tagged;
pub mod traits;

pub use membership::{InvalidationPolicy, MembershipCache, DEFAULT_TTL};
pub use none::NoCache;
pub use tagged::TaggedMemoryCache;
pub use traits::{CacheBackend, CacheEntry, CacheError, CacheKey, CacheTicket, FlushScope, Owner};
