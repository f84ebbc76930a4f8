//! Process-local tagged cache with TTL and per-kind generations
//!
//! One `RwLock` guards both the entries and the generation counters, so a
//! flush and a concurrent `put` are totally ordered: a `put` carrying a
//! ticket older than the last flush of its kind is discarded.

use super::traits::{CacheBackend, CacheEntry, CacheError, CacheKey, CacheTicket, FlushScope};
use crate::model::{MemberRecord, RelationKind};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

#[derive(Debug, Default)]
struct TaggedState {
    entries: HashMap<CacheKey, CacheEntry>,
    generations: [u64; 2],
}

/// In-memory tagged cache
#[derive(Debug, Default)]
pub struct TaggedMemoryCache {
    state: RwLock<TaggedState>,
}

impl TaggedMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> CacheError {
    CacheError::Unavailable("tagged cache lock poisoned".to_string())
}

impl CacheBackend for TaggedMemoryCache {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Vec<MemberRecord>>, CacheError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.entries.get(key).filter(|entry| !entry.is_expired()).map(|e| e.value.clone()))
    }

    fn ticket(&self, kind: RelationKind) -> Result<CacheTicket, CacheError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(CacheTicket { kind, generation: state.generations[kind.index()] })
    }

    fn put(
        &self,
        key: CacheKey,
        value: Vec<MemberRecord>,
        ttl: Duration,
        ticket: CacheTicket,
    ) -> Result<bool, CacheError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        // expired entries are dropped on every write
        state.entries.retain(|_, entry| !entry.is_expired());
        if ticket.kind != key.kind || state.generations[key.kind.index()] != ticket.generation {
            return Ok(false);
        }
        state.entries.insert(key, CacheEntry::new(value, ttl));
        Ok(true)
    }

    fn flush(&self, scope: &FlushScope) -> Result<usize, CacheError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.generations[scope.kind().index()] += 1;
        let before = state.entries.len();
        state.entries.retain(|key, _| !scope.covers(key));
        Ok(before - state.entries.len())
    }

    fn len(&self) -> usize {
        self.state.read().map(|state| state.entries.len()).unwrap_or(0)
    }
}
