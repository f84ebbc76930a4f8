//! No-op cache backend. Every read goes to the store

use super::traits::{CacheBackend, CacheError, CacheKey, CacheTicket, FlushScope};
use crate::model::{MemberRecord, RelationKind};
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CacheBackend for NoCache {
    fn name(&self) -> &str {
        "none"
    }

    fn supports_tags(&self) -> bool {
        false
    }

    fn get(&self, _key: &CacheKey) -> Result<Option<Vec<MemberRecord>>, CacheError> {
        Ok(None)
    }

    fn ticket(&self, kind: RelationKind) -> Result<CacheTicket, CacheError> {
        Ok(CacheTicket { kind, generation: 0 })
    }

    fn put(
        &self,
        _key: CacheKey,
        _value: Vec<MemberRecord>,
        _ttl: Duration,
        _ticket: CacheTicket,
    ) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn flush(&self, _scope: &FlushScope) -> Result<usize, CacheError> {
        Ok(0)
    }

    fn len(&self) -> usize {
        0
    }
}
