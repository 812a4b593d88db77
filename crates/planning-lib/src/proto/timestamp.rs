//! Helpers for `google.protobuf.Timestamp`
//!
//! Conversions to and from chrono, and serde adapters that render
//! timestamps as RFC 3339 strings in JSON.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use prost_types::Timestamp;

/// Build a timestamp from a chrono UTC datetime
pub fn from_datetime(datetime: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: datetime.timestamp(),
        nanos: datetime.timestamp_subsec_nanos() as i32,
    }
}

/// Convert a timestamp to a chrono UTC datetime.
///
/// Returns `None` for negative nanos or values outside chrono's range.
pub fn to_datetime(timestamp: &Timestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(timestamp.nanos).ok()?;
    Utc.timestamp_opt(timestamp.seconds, nanos).single()
}

/// Timestamp at whole seconds since the Unix epoch
pub fn from_unix_seconds(seconds: i64) -> Timestamp {
    Timestamp { seconds, nanos: 0 }
}

/// Format a timestamp as RFC 3339, falling back to raw seconds/nanos
pub fn format(timestamp: &Timestamp) -> String {
    match to_datetime(timestamp) {
        Some(datetime) => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        None => format!("{}s+{}ns", timestamp.seconds, timestamp.nanos),
    }
}

/// `(seconds, nanos)` ordering key
pub(crate) fn sort_key(timestamp: &Timestamp) -> (i64, i32) {
    (timestamp.seconds, timestamp.nanos)
}

/// Serde adapter for `Option<Timestamp>` fields
pub mod option {
    use super::{format, from_datetime, to_datetime};
    use chrono::{DateTime, Utc};
    use prost_types::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => {
                if to_datetime(timestamp).is_none() {
                    return Err(serde::ser::Error::custom(format!(
                        "timestamp {} is out of range",
                        format(timestamp)
                    )));
                }
                serializer.serialize_some(&format(timestamp))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|text| {
            DateTime::parse_from_rfc3339(&text)
                .map(|datetime| from_datetime(datetime.with_timezone(&Utc)))
                .map_err(|e| <D::Error as serde::de::Error>::custom(format!("invalid timestamp `{}`: {}", text, e)))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_conversion() {
        let datetime = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let timestamp = from_datetime(datetime);
        assert_eq!(timestamp.seconds, datetime.timestamp());
        assert_eq!(timestamp.nanos, 0);
        assert_eq!(to_datetime(&timestamp), Some(datetime));
        assert_eq!(format(&timestamp), "2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_negative_nanos_are_rejected() {
        let timestamp = Timestamp {
            seconds: 10,
            nanos: -1,
        };
        assert_eq!(to_datetime(&timestamp), None);
        assert_eq!(format(&timestamp), "10s+-1ns");
    }
}
