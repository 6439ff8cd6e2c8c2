use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;
use utoipa::IntoParams;

use super::ReadingError;
use crate::db::models::{Reading, SensorType};

/// Optional query string filters shared by every read endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadingsQuery {
    /// `temperature` or `humidity`.
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    /// First calendar day to include (`YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Last calendar day to include (`YYYY-MM-DD`).
    pub date_to: Option<String>,
}

/// Concrete predicate handed to the store.
///
/// Both bounds are exclusive epoch-second timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingFilter {
    pub device_uuid: String,
    pub sensor_type: Option<SensorType>,
    /// `date_created > created_after`
    pub created_after: Option<i64>,
    /// `date_created < created_before`
    pub created_before: Option<i64>,
}

impl ReadingFilter {
    /// Turn raw query parameters into a filter for one device.
    ///
    /// Calendar dates are widened by one day and compared strictly, so every
    /// second of `date_from` and `date_to` (UTC) is included.
    pub fn build(device_uuid: &str, query: &ReadingsQuery) -> Result<Self, ReadingError> {
        let sensor_type = non_empty(&query.sensor_type)
            .map(str::parse::<SensorType>)
            .transpose()
            .map_err(ReadingError::Validation)?;

        let created_after = non_empty(&query.date_from)
            .map(|raw| day_boundary("date_from", raw, -1))
            .transpose()?;

        let created_before = non_empty(&query.date_to)
            .map(|raw| day_boundary("date_to", raw, 1))
            .transpose()?;

        Ok(Self {
            device_uuid: device_uuid.to_owned(),
            sensor_type,
            created_after,
            created_before,
        })
    }

    /// In-process evaluation of the same predicate the SQL store applies.
    pub fn matches(&self, reading: &Reading) -> bool {
        reading.device_uuid == self.device_uuid
            && self.sensor_type.map_or(true, |t| reading.sensor_type == t)
            && self.created_after.map_or(true, |ts| reading.date_created > ts)
            && self.created_before.map_or(true, |ts| reading.date_created < ts)
    }
}

fn non_empty(param: &Option<String>) -> Option<&str> {
    param.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Midnight UTC of `raw` shifted by `offset_days`, as epoch seconds.
fn day_boundary(field: &str, raw: &str, offset_days: i64) -> Result<i64, ReadingError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        ReadingError::Validation(format!("{field} must be a date (YYYY-MM-DD); got {raw:?}: {e}"))
    })?;

    date.checked_add_signed(Duration::days(offset_days))
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp())
        .ok_or_else(|| ReadingError::Validation(format!("{field} is out of range: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-09 / 10 / 11 / 12 at 00:00:00 UTC
    const MAR_09: i64 = 1_709_942_400;
    const MAR_10: i64 = 1_710_028_800;
    const MAR_11: i64 = 1_710_115_200;
    const MAR_12: i64 = 1_710_201_600;

    fn query(sensor_type: Option<&str>, from: Option<&str>, to: Option<&str>) -> ReadingsQuery {
        ReadingsQuery {
            sensor_type: sensor_type.map(Into::into),
            date_from: from.map(Into::into),
            date_to: to.map(Into::into),
        }
    }

    fn reading_at(ts: i64) -> Reading {
        Reading {
            device_uuid: "dev1".into(),
            sensor_type: SensorType::Temperature,
            value: 50.0,
            date_created: ts,
        }
    }

    #[test]
    fn no_params_filters_on_device_only() {
        let f = ReadingFilter::build("dev1", &ReadingsQuery::default()).unwrap();
        assert_eq!(
            f,
            ReadingFilter {
                device_uuid: "dev1".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn dates_expand_one_day_outward() {
        let f = ReadingFilter::build("dev1", &query(None, Some("2024-03-10"), Some("2024-03-11")))
            .unwrap();
        assert_eq!(f.created_after, Some(MAR_09));
        assert_eq!(f.created_before, Some(MAR_12));
    }

    #[test]
    fn whole_calendar_days_are_inclusive() {
        let f = ReadingFilter::build("dev1", &query(None, Some("2024-03-10"), Some("2024-03-10")))
            .unwrap();

        assert!(f.matches(&reading_at(MAR_10)));
        assert!(f.matches(&reading_at(MAR_11 - 1)));
    }

    #[test]
    fn lower_bound_is_strict_against_the_previous_midnight() {
        let f = ReadingFilter::build("dev1", &query(None, Some("2024-03-10"), Some("2024-03-10")))
            .unwrap();

        assert!(!f.matches(&reading_at(MAR_09)));
        assert!(f.matches(&reading_at(MAR_09 + 1)));
        assert!(!f.matches(&reading_at(MAR_11)));
    }

    #[test]
    fn type_filter_is_parsed() {
        let f = ReadingFilter::build("dev1", &query(Some("humidity"), None, None)).unwrap();
        assert_eq!(f.sensor_type, Some(SensorType::Humidity));
        assert!(!f.matches(&reading_at(MAR_10)));
    }

    #[test]
    fn empty_params_are_treated_as_absent() {
        let f = ReadingFilter::build("dev1", &query(Some(""), Some(" "), Some(""))).unwrap();
        assert_eq!(f.sensor_type, None);
        assert_eq!(f.created_after, None);
        assert_eq!(f.created_before, None);
    }

    #[test]
    fn unknown_type_is_a_validation_error() {
        let err = ReadingFilter::build("dev1", &query(Some("pressure"), None, None)).unwrap_err();
        assert!(matches!(err, ReadingError::Validation(_)));
    }

    #[test]
    fn malformed_dates_are_validation_errors() {
        for bad in ["2024-13-01", "yesterday", "10/03/2024", "2024-03-10T00:00:00"] {
            let err = ReadingFilter::build("dev1", &query(None, Some(bad), None)).unwrap_err();
            assert!(
                matches!(err, ReadingError::Validation(ref m) if m.contains("date_from")),
                "{bad} should be rejected"
            );
        }
        let err = ReadingFilter::build("dev1", &query(None, None, Some("nope"))).unwrap_err();
        assert!(matches!(err, ReadingError::Validation(ref m) if m.contains("date_to")));
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let f = ReadingFilter::build("dev1", &query(None, Some("2024-03-12"), Some("2024-03-09")))
            .unwrap();
        for ts in [MAR_09, MAR_10, MAR_11, MAR_12] {
            assert!(!f.matches(&reading_at(ts)));
        }
    }

    #[test]
    fn other_devices_never_match() {
        let f = ReadingFilter::build("dev2", &ReadingsQuery::default()).unwrap();
        assert!(!f.matches(&reading_at(MAR_10)));
    }
}
