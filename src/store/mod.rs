//! Persistence for readings.
//!
//! The aggregation code only talks to [`ReadingStore`]; which backend sits
//! behind it is decided once at startup.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

use crate::{db::models::Reading, readings::filter::ReadingFilter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Append-only reading storage.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append one reading.
    async fn insert(&self, reading: &Reading) -> Result<(), StoreError>;

    /// Readings matching `filter`, in insertion order.
    async fn scan(&self, filter: &ReadingFilter) -> Result<Vec<Reading>, StoreError>;

    /// Every device that has at least one reading, in first-seen order.
    async fn distinct_device_ids(&self) -> Result<Vec<String>, StoreError>;
}

pub type SharedStore = Arc<dyn ReadingStore>;
