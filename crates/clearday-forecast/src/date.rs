//! Calendar-date normalization for forecast records.
//!
//! Upstream providers disagree on how a forecast day is stamped: AQICN sends
//! `2024-12-20`, Open-Meteo sends either ISO timestamps or Unix seconds, and
//! stored records may carry an offset. Everything is reduced to a plain
//! [`NaiveDate`] before any joining happens. Timestamps with an offset are
//! converted to UTC first, then truncated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::types::ForecastError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

/// A forecast day, stored without time or timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForecastDate(NaiveDate);

impl ForecastDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a date from a Unix timestamp, taking the UTC calendar day.
    pub fn from_unix_seconds(secs: i64) -> Result<Self, ForecastError> {
        DateTime::<Utc>::from_timestamp(secs, 0)
            .map(|dt| Self(dt.date_naive()))
            .ok_or_else(|| ForecastError::InvalidDate(secs.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for ForecastDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<ForecastDate> for NaiveDate {
    fn from(date: ForecastDate) -> Self {
        date.0
    }
}

impl FromStr for ForecastDate {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return Ok(Self(date));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc).date_naive()));
        }

        for format in OFFSET_DATETIME_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Ok(Self(dt.with_timezone(&Utc).date_naive()));
            }
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self(dt.date()));
            }
        }

        Err(ForecastError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for ForecastDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for ForecastDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawForecastDate {
    Unix(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for ForecastDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawForecastDate::deserialize(deserializer)? {
            RawForecastDate::Unix(secs) => Self::from_unix_seconds(secs).map_err(de::Error::custom),
            RawForecastDate::Text(s) => s.parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plain_date() {
        let date: ForecastDate = "2024-12-20".parse().unwrap();
        assert_eq!(date.date(), ymd(2024, 12, 20));
    }

    #[test]
    fn test_naive_datetime_drops_time() {
        let date: ForecastDate = "2024-12-20T23:30:00".parse().unwrap();
        assert_eq!(date.date(), ymd(2024, 12, 20));

        let date: ForecastDate = "2024-12-20T06:00".parse().unwrap();
        assert_eq!(date.date(), ymd(2024, 12, 20));
    }

    #[test]
    fn test_offset_datetime_is_converted_to_utc() {
        let date: ForecastDate = "2024-12-20T00:00:00+01:00".parse().unwrap();
        assert_eq!(date.date(), ymd(2024, 12, 19));

        let date: ForecastDate = "2024-12-20T00:00:00Z".parse().unwrap();
        assert_eq!(date.date(), ymd(2024, 12, 20));
    }

    #[test]
    fn test_space_separated_offset() {
        let date: ForecastDate = "2024-12-20 00:00:00+00:00".parse().unwrap();
        assert_eq!(date.date(), ymd(2024, 12, 20));
    }

    #[test]
    fn test_unix_seconds() {
        // 2024-12-20T00:00:00Z
        let date = ForecastDate::from_unix_seconds(1_734_652_800).unwrap();
        assert_eq!(date.date(), ymd(2024, 12, 20));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = "next tuesday".parse::<ForecastDate>().unwrap_err();
        assert!(matches!(err, ForecastError::InvalidDate(_)));
    }

    #[test]
    fn test_serde_formats() {
        let date: ForecastDate = serde_json::from_str("\"2024-12-20T10:00:00\"").unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-12-20\"");

        let date: ForecastDate = serde_json::from_str("1734652800").unwrap();
        assert_eq!(date.to_string(), "2024-12-20");
    }
}
