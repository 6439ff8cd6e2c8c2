//! Reading ingestion and the query/aggregation engine.

pub mod filter;
pub mod metrics;
pub mod service;

use serde::Deserialize;
use utoipa::ToSchema;

pub use filter::{ReadingFilter, ReadingsQuery};
pub use metrics::{DeviceSummary, Metric, MetricResult, Mode, Quartiles, Sample, Statistic};
pub use service::ReadingService;

use crate::{
    db::models::{Reading, SensorType},
    store::StoreError,
};

/// Inclusive bounds for a reading value.
pub const VALUE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

#[derive(Debug, thiserror::Error)]
pub enum ReadingError {
    /// Malformed or out-of-range input. Nothing was persisted.
    #[error("{0}")]
    Validation(String),
    #[error("unknown metric: {0:?}")]
    UnknownMetric(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request body for `POST /devices/{uuid}/readings`.
///
/// Any `device_uuid` in the body is ignored; the path decides.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewReading {
    /// `temperature` or `humidity`.
    #[serde(rename = "type")]
    pub sensor_type: String,
    /// Between 0 and 100 inclusive.
    pub value: f64,
}

impl NewReading {
    /// Checks the payload and stamps it with the owning device and creation time.
    pub fn validate(self, device_uuid: &str, date_created: i64) -> Result<Reading, ReadingError> {
        let sensor_type = self
            .sensor_type
            .parse::<SensorType>()
            .map_err(ReadingError::Validation)?;

        if !self.value.is_finite() || !VALUE_RANGE.contains(&self.value) {
            return Err(ReadingError::Validation(format!(
                "value must be between {} and {}; got {}",
                VALUE_RANGE.start(),
                VALUE_RANGE.end(),
                self.value
            )));
        }

        Ok(Reading {
            device_uuid: device_uuid.to_owned(),
            sensor_type,
            value: self.value,
            date_created,
        })
    }
}
