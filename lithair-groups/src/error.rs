//! Error taxonomy for the membership engine

use crate::model::EntityId;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The referenced group (or entity) does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    /// The persistence layer failed (constraint violation, lost connection, ...)
    #[error("Store error: {0}")]
    Store(String),

    /// Cache backend unreachable. Readers never see this, they bypass the cache
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn group_not_found(id: &EntityId) -> Self {
        Error::NotFound { entity: "group", id: id.clone() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Config(format!("{:#}", err))
    }
}
