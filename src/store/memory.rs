use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ReadingStore, StoreError};
use crate::{db::models::Reading, readings::filter::ReadingFilter};

/// Process-local reading log.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Uses `tokio::sync::RwLock` so concurrent scans never block each other;
/// inserts take the write lock and are serialised.
#[derive(Clone, Default)]
pub struct MemoryReadingStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn insert(&self, reading: &Reading) -> Result<(), StoreError> {
        self.inner.write().await.push(reading.clone());
        Ok(())
    }

    async fn scan(&self, filter: &ReadingFilter) -> Result<Vec<Reading>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn distinct_device_ids(&self) -> Result<Vec<String>, StoreError> {
        let readings = self.inner.read().await;
        let mut seen = HashSet::new();
        Ok(readings
            .iter()
            .filter(|r| seen.insert(r.device_uuid.as_str()))
            .map(|r| r.device_uuid.clone())
            .collect())
    }
}
