use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{
    error::StoreError, id::ShortId, models::UrlMapping, repository::MappingStore,
};

/// In-process store. Mappings live as long as the process.
#[derive(Debug, Default)]
pub struct DB {
    table: DashMap<ShortId, UrlMapping>,
}

impl DB {
    pub fn new() -> Self {
        DB {
            table: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl MappingStore for DB {
    async fn try_insert(&self, id: &ShortId, long_url: &str) -> Result<bool, StoreError> {
        // The entry holds the shard write lock until it is dropped.
        match self.table.entry(id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(UrlMapping {
                    short_id: id.clone(),
                    long_url: long_url.to_string(),
                    created_at: Utc::now(),
                });
                Ok(true)
            }
        }
    }

    async fn lookup(&self, id: &ShortId) -> Result<Option<UrlMapping>, StoreError> {
        Ok(self.table.get(id).map(|m| m.value().clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
