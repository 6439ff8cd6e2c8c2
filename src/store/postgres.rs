use async_trait::async_trait;
use sqlx::PgPool;

use super::{ReadingStore, StoreError};
use crate::{db::models::Reading, readings::filter::ReadingFilter};

/// `readings` table access. Every caller-supplied value is a bound parameter.
#[derive(Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert(&self, reading: &Reading) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO readings (device_uuid, "type", value, date_created)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&reading.device_uuid)
        .bind(reading.sensor_type)
        .bind(reading.value)
        .bind(reading.date_created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn scan(&self, filter: &ReadingFilter) -> Result<Vec<Reading>, StoreError> {
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT device_uuid,
                   "type" AS sensor_type,
                   value,
                   date_created
            FROM readings
            WHERE device_uuid = $1
              AND ($2::reading_type IS NULL OR "type" = $2)
              AND ($3::bigint IS NULL OR date_created > $3)
              AND ($4::bigint IS NULL OR date_created < $4)
            ORDER BY id ASC
            "#,
        )
        .bind(&filter.device_uuid)
        .bind(filter.sensor_type)
        .bind(filter.created_after)
        .bind(filter.created_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn distinct_device_ids(&self) -> Result<Vec<String>, StoreError> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT device_uuid
            FROM readings
            GROUP BY device_uuid
            ORDER BY MIN(id) ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Tests (need a live Postgres reachable through DATABASE_URL)
// ---------------------------------------------------------------------------
