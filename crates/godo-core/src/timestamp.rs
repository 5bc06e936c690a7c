//! Timestamp scalar used by action records.
//!
//! The API is not consistent about time encoding: some fields arrive as
//! RFC 3339 strings, others as bare Unix epoch integers. [`Timestamp`]
//! accepts both and always serializes as RFC 3339.

use crate::stringify::Field;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A point in time decoded from RFC 3339 text or epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a [`DateTime`].
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    /// Build from Unix epoch seconds.
    #[must_use]
    pub fn from_unix(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Returns the inner [`DateTime`].
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Converts to the inner [`DateTime`].
    #[must_use]
    pub const fn into_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(time: DateTime<Utc>) -> Self {
        Self(time)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Field for Timestamp {
    fn is_zero(&self) -> bool {
        self.0.timestamp() == 0 && self.0.timestamp_subsec_nanos() == 0
    }

    fn render(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an RFC 3339 string or Unix epoch seconds")
    }

    fn visit_i64<E: de::Error>(self, secs: i64) -> Result<Timestamp, E> {
        Timestamp::from_unix(secs)
            .ok_or_else(|| E::custom(format!("epoch seconds out of range: {secs}")))
    }

    fn visit_u64<E: de::Error>(self, secs: u64) -> Result<Timestamp, E> {
        let secs = i64::try_from(secs)
            .map_err(|_| E::custom(format!("epoch seconds out of range: {secs}")))?;
        self.visit_i64(secs)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
        DateTime::parse_from_rfc3339(value)
            .map(|time| Timestamp(time.with_timezone(&Utc)))
            .map_err(|err| E::custom(format!("invalid timestamp `{value}`: {err}")))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}
