use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Mirrors the `reading_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reading_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Humidity,
}

impl SensorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(Self::Temperature),
            "humidity" => Ok(Self::Humidity),
            other => Err(format!(
                "type must be one of \"temperature\", \"humidity\"; got {other:?}"
            )),
        }
    }
}

/// A single stored observation. Readings are append-only.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Reading {
    pub device_uuid: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    /// Within `[0, 100]`.
    pub value: f64,
    /// Unix timestamp (seconds), assigned by the server on insert.
    pub date_created: i64,
}
