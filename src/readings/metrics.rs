//! Statistics over a device's filtered readings.
//!
//! A [`Sample`] is built once per scan and every metric is read off it, so a
//! summary never goes back to the store per statistic.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::ReadingError;
use crate::db::models::Reading;

/// Reported by [`Sample::mode`] when several values share the top count.
pub const MULTIPLE_MODES: &str = "Multiple Modes";

// ---------------------------------------------------------------------------
// Metric names
// ---------------------------------------------------------------------------

/// A statistic computed from one device's sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Min,
    Max,
    Median,
    Mean,
    Mode,
    Quartiles,
}

/// The `{metric}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Statistic(Statistic),
    /// Every statistic for every known device.
    Summary,
}

impl FromStr for Metric {
    type Err = ReadingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stat = match s {
            "min" => Statistic::Min,
            "max" => Statistic::Max,
            "median" => Statistic::Median,
            "mean" => Statistic::Mean,
            "mode" => Statistic::Mode,
            "quartiles" => Statistic::Quartiles,
            "summary" => return Ok(Self::Summary),
            other => return Err(ReadingError::UnknownMetric(other.to_owned())),
        };
        Ok(Self::Statistic(stat))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Statistic(Statistic::Min) => "min",
            Metric::Statistic(Statistic::Max) => "max",
            Metric::Statistic(Statistic::Median) => "median",
            Metric::Statistic(Statistic::Mean) => "mean",
            Metric::Statistic(Statistic::Mode) => "mode",
            Metric::Statistic(Statistic::Quartiles) => "quartiles",
            Metric::Summary => "summary",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Most frequent value, or a marker when the top count is shared.
///
/// Serialises as a number or as the string `"Multiple Modes"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Single(f64),
    Multiple,
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mode::Single(v) => serializer.serialize_f64(*v),
            Mode::Multiple => serializer.serialize_str(MULTIPLE_MODES),
        }
    }
}

/// First and third quartile; both `null` for an empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Quartiles {
    pub quartile_1: Option<f64>,
    pub quartile_3: Option<f64>,
}

/// Every statistic for one device.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeviceSummary {
    pub device_uuid: String,
    pub number_of_readings: usize,
    pub min_reading_value: Option<f64>,
    pub max_reading_value: Option<f64>,
    pub median_reading_value: Option<f64>,
    pub mean_reading_value: Option<f64>,
    /// A number, or `"Multiple Modes"`.
    #[schema(value_type = Object)]
    pub mode_reading_value: Option<Mode>,
    pub quartile_1_value: Option<f64>,
    pub quartile_3_value: Option<f64>,
}

impl DeviceSummary {
    pub fn from_sample(device_uuid: String, sample: &Sample) -> Self {
        let Quartiles {
            quartile_1,
            quartile_3,
        } = sample.quartiles();

        Self {
            device_uuid,
            number_of_readings: sample.len(),
            min_reading_value: sample.min(),
            max_reading_value: sample.max(),
            median_reading_value: sample.median(),
            mean_reading_value: sample.mean(),
            mode_reading_value: sample.mode(),
            quartile_1_value: quartile_1,
            quartile_3_value: quartile_3,
        }
    }
}

/// Response body of `GET /devices/{uuid}/readings/{metric}`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum MetricResult {
    Value {
        value: Option<f64>,
    },
    Mode {
        /// A number, or `"Multiple Modes"`.
        #[schema(value_type = Object)]
        value: Option<Mode>,
    },
    Quartiles(Quartiles),
    Summary(Vec<DeviceSummary>),
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// Reading values sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    sorted: Vec<f64>,
}

impl Sample {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    pub fn from_readings(readings: &[Reading]) -> Self {
        Self::new(readings.iter().map(|r| r.value))
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.sorted.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.sorted.last().copied()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.sorted.iter().sum::<f64>() / self.len() as f64)
    }

    /// Middle value; the average of the two middle values for even lengths.
    pub fn median(&self) -> Option<f64> {
        let n = self.len();
        match n {
            0 => None,
            _ if n % 2 == 1 => Some(self.sorted[n / 2]),
            _ => Some((self.sorted[n / 2 - 1] + self.sorted[n / 2]) / 2.0),
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        let mut best: Option<(f64, usize)> = None;
        let mut tied = false;

        // Equal values are adjacent once sorted.
        let mut start = 0;
        while start < self.sorted.len() {
            let value = self.sorted[start];
            let run = self.sorted[start..]
                .iter()
                .take_while(|v| **v == value)
                .count();

            match best {
                Some((_, top)) if run < top => {}
                Some((_, top)) if run == top => tied = true,
                _ => {
                    best = Some((value, run));
                    tied = false;
                }
            }
            start += run;
        }

        best.map(|(value, _)| if tied { Mode::Multiple } else { Mode::Single(value) })
    }

    pub fn quartiles(&self) -> Quartiles {
        Quartiles {
            quartile_1: self.percentile(25.0),
            quartile_3: self.percentile(75.0),
        }
    }

    /// Percentile with linear interpolation between the closest ranks.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        let last = self.len().checked_sub(1)?;
        let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        let (a, b) = (self.sorted[lo], self.sorted[hi]);
        Some(a + (b - a) * (rank - lo as f64))
    }

    pub fn statistic(&self, stat: Statistic) -> MetricResult {
        match stat {
            Statistic::Min => MetricResult::Value { value: self.min() },
            Statistic::Max => MetricResult::Value { value: self.max() },
            Statistic::Median => MetricResult::Value { value: self.median() },
            Statistic::Mean => MetricResult::Value { value: self.mean() },
            Statistic::Mode => MetricResult::Mode { value: self.mode() },
            Statistic::Quartiles => MetricResult::Quartiles(self.quartiles()),
        }
    }
}
