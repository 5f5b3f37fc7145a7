//! In-memory content store.

use std::collections::HashMap;

use async_trait::async_trait;
use folio_core::{Collection, CoreError, Record};
use tracing::debug;

use crate::{
    error::Result,
    store::{ContentStore, Query},
};

/// Read-only snapshot of every collection, each in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<Collection, Vec<Record>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, rejecting duplicate identifiers.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> folio_core::Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Append a record to its collection.
    pub fn insert(&mut self, record: Record) -> folio_core::Result<()> {
        let collection = record.collection();
        let entries = self.records.entry(collection).or_default();
        if entries.iter().any(|existing| existing.id == record.id) {
            return Err(CoreError::Duplicate {
                collection: collection.name().to_string(),
                id: record.id.to_string(),
            });
        }
        entries.push(record);
        Ok(())
    }

    /// Records of a collection in insertion order.
    pub fn records(&self, collection: Collection) -> &[Record] {
        self.records
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.records(collection).len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.values().all(Vec::is_empty)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn execute(&self, query: &Query) -> Result<Vec<Record>> {
        let result = query.apply(self.records(query.collection));
        debug!(
            collection = %query.collection,
            matched = result.as_ref().map_or(0, Vec::len),
            ok = result.is_ok(),
            "executed query"
        );
        result
    }
}
