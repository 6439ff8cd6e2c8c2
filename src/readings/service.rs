use chrono::Utc;
use tracing::{debug, info};

use super::{
    DeviceSummary, Metric, MetricResult, NewReading, ReadingError, ReadingFilter, ReadingsQuery,
    Sample,
};
use crate::{db::models::Reading, store::SharedStore};

/// Ingestion and aggregation over an injected [`ReadingStore`](crate::store::ReadingStore).
///
/// Holds no per-request state; every call scans the store afresh, so reads
/// always observe earlier writes.
#[derive(Clone)]
pub struct ReadingService {
    store: SharedStore,
}

impl ReadingService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Validates `payload`, stamps it with the current time and appends it.
    pub async fn record(
        &self,
        device_uuid: &str,
        payload: NewReading,
    ) -> Result<Reading, ReadingError> {
        let reading = payload.validate(device_uuid, Utc::now().timestamp())?;
        self.store.insert(&reading).await?;

        info!(
            device_uuid = %reading.device_uuid,
            sensor_type = %reading.sensor_type,
            value = reading.value,
            "Reading recorded"
        );
        Ok(reading)
    }

    /// Readings for one device matching `query`, oldest first.
    pub async fn list(
        &self,
        device_uuid: &str,
        query: &ReadingsQuery,
    ) -> Result<Vec<Reading>, ReadingError> {
        let filter = ReadingFilter::build(device_uuid, query)?;
        Ok(self.store.scan(&filter).await?)
    }

    /// Computes `metric` for one device, or the all-device summary.
    ///
    /// The path device is ignored for [`Metric::Summary`].
    pub async fn metric(
        &self,
        device_uuid: &str,
        metric: Metric,
        query: &ReadingsQuery,
    ) -> Result<MetricResult, ReadingError> {
        debug!(device_uuid = %device_uuid, metric = %metric, ?query, "Computing metric");

        match metric {
            Metric::Statistic(stat) => {
                let filter = ReadingFilter::build(device_uuid, query)?;
                let sample = self.sample(&filter).await?;
                Ok(sample.statistic(stat))
            }
            Metric::Summary => Ok(MetricResult::Summary(self.summary(query).await?)),
        }
    }

    /// One record per device in first-seen order, each built from a single
    /// scan with the caller's type and date filters applied.
    pub async fn summary(&self, query: &ReadingsQuery) -> Result<Vec<DeviceSummary>, ReadingError> {
        // Validate before touching the store.
        ReadingFilter::build("", query)?;

        let device_ids = self.store.distinct_device_ids().await?;
        let mut summaries = Vec::with_capacity(device_ids.len());

        for device_uuid in device_ids {
            let filter = ReadingFilter::build(&device_uuid, query)?;
            let sample = self.sample(&filter).await?;
            summaries.push(DeviceSummary::from_sample(device_uuid, &sample));
        }

        info!(devices = summaries.len(), "Summary computed");
        Ok(summaries)
    }

    async fn sample(&self, filter: &ReadingFilter) -> Result<Sample, ReadingError> {
        let readings = self.store.scan(filter).await?;
        debug!(device_uuid = %filter.device_uuid, readings = readings.len(), "Scanned readings");
        Ok(Sample::from_readings(&readings))
    }
}
