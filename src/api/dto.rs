use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::{Reading, SensorType};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub device_uuid: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub value: f64,
    /// Unix timestamp (seconds) assigned by the server.
    pub date_created: i64,
}

/// Response for `POST /devices/{uuid}/readings`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingCreatedDto {
    pub data: ReadingDto,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            device_uuid: r.device_uuid,
            sensor_type: r.sensor_type,
            value: r.value,
            date_created: r.date_created,
        }
    }
}
