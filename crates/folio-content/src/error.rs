//! Query-time errors.

use std::sync::Arc;

use folio_core::{Collection, CoreError, RecordId};
use thiserror::Error;

/// Result type for content queries.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Failures surfaced by accessors.
///
/// Absent records are never errors. The type is `Clone` so a single failed
/// load can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ContentError {
    /// The name does not refer to a configured collection.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// Invalid query parameters, e.g. ordering by a field some records lack.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// The content store failed to answer.
    #[error("store failure in {collection}: {source}")]
    Store {
        collection: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The store returned a record of another collection's type.
    #[error("unexpected record {id} returned for collection {collection}")]
    UnexpectedRecord {
        collection: Collection,
        id: RecordId,
    },

    /// One cache key was used for two different value types.
    #[error("cache key {0} already holds a value of another type")]
    CacheConflict(String),
}

impl ContentError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedQuery(message.into())
    }

    /// Wrap an underlying store failure.
    pub fn store(
        collection: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            collection: collection.into(),
            source: Arc::new(source),
        }
    }

    pub fn is_malformed_query(&self) -> bool {
        matches!(self, Self::MalformedQuery(_))
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}

impl From<CoreError> for ContentError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownCollection(name) => Self::UnknownCollection(name),
            other => Self::store("content", other),
        }
    }
}
