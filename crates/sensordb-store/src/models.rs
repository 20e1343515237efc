//! Data models for stored data.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// One set of raw measurements from the BMP280 and HTU21D sensors.
///
/// Values are stored exactly as given. No range checks, no unit
/// conversion; NaN and infinities pass through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// BMP280 temperature in Celsius.
    pub bmp280_temperature: f64,
    /// BMP280 pressure in hPa.
    pub bmp280_pressure: f64,
    /// HTU21D temperature in Celsius.
    pub htu21d_temperature: f64,
    /// HTU21D relative humidity percentage.
    pub htu21d_humidity: f64,
}

impl Reading {
    /// Create a reading from the four sensor values.
    pub fn new(
        bmp280_temperature: f64,
        bmp280_pressure: f64,
        htu21d_temperature: f64,
        htu21d_humidity: f64,
    ) -> Self {
        Self {
            bmp280_temperature,
            bmp280_pressure,
            htu21d_temperature,
            htu21d_humidity,
        }
    }
}

/// A sample stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Database row ID, assigned by the store.
    pub id: i64,
    /// Creation time as recorded by SQLite (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub timestamp: String,
    /// BMP280 temperature in Celsius.
    pub bmp280_temperature: f64,
    /// BMP280 pressure in hPa.
    pub bmp280_pressure: f64,
    /// HTU21D temperature in Celsius.
    pub htu21d_temperature: f64,
    /// HTU21D relative humidity percentage.
    pub htu21d_humidity: f64,
}

/// Layout of SQLite's `CURRENT_TIMESTAMP`.
const SQLITE_TIMESTAMP: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

impl Sample {
    /// Parse [`timestamp`](Self::timestamp) as a UTC date-time.
    ///
    /// Returns `None` when the stored text is not in SQLite's
    /// `CURRENT_TIMESTAMP` shape.
    pub fn recorded_at(&self) -> Option<OffsetDateTime> {
        PrimitiveDateTime::parse(&self.timestamp, SQLITE_TIMESTAMP)
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    }

    /// The measurements of this sample.
    pub fn reading(&self) -> Reading {
        Reading {
            bmp280_temperature: self.bmp280_temperature,
            bmp280_pressure: self.bmp280_pressure,
            htu21d_temperature: self.htu21d_temperature,
            htu21d_humidity: self.htu21d_humidity,
        }
    }
}

/// The role a store handle was opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// May create the store, append samples and evict old ones.
    Producer,
    /// May only read from a store that already exists.
    Consumer,
}

impl Mode {
    /// Whether this role may create or modify the store.
    pub fn is_writable(self) -> bool {
        matches!(self, Mode::Producer)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Producer => f.write_str("producer"),
            Mode::Consumer => f.write_str("consumer"),
        }
    }
}

/// Maximum number of samples a producer keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Retention {
    /// Never evict.
    #[default]
    Unbounded,
    /// Keep at most this many of the newest samples.
    Limit(NonZeroU32),
}

impl Retention {
    /// The row limit, if any.
    pub fn limit(self) -> Option<u32> {
        match self {
            Retention::Unbounded => None,
            Retention::Limit(n) => Some(n.get()),
        }
    }
}

impl From<i64> for Retention {
    /// Zero and negative limits mean unbounded; limits above `u32::MAX`
    /// saturate.
    fn from(limit: i64) -> Self {
        let clamped = limit.clamp(0, i64::from(u32::MAX));
        u32::try_from(clamped)
            .ok()
            .and_then(NonZeroU32::new)
            .map_or(Retention::Unbounded, Retention::Limit)
    }
}

impl fmt::Display for Retention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Retention::Unbounded => f.write_str("unbounded"),
            Retention::Limit(n) => write!(f, "{} samples", n),
        }
    }
}

/// What the retention step did after an append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eviction {
    /// Retention is unbounded; nothing to do.
    Skipped,
    /// This many old samples were removed (possibly zero).
    Evicted(usize),
    /// The delete failed. The appended sample is stored regardless and the
    /// store may hold more rows than the limit until the next append.
    Failed(String),
}

/// Result of a successful [`Store::append`](crate::Store::append).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// ID assigned to the new sample.
    pub id: i64,
    /// Outcome of the retention step.
    pub eviction: Eviction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(timestamp: &str) -> Sample {
        Sample {
            id: 1,
            timestamp: timestamp.to_string(),
            bmp280_temperature: 21.0,
            bmp280_pressure: 1000.0,
            htu21d_temperature: 20.5,
            htu21d_humidity: 48.0,
        }
    }

    #[test]
    fn test_retention_from_limit() {
        assert_eq!(Retention::from(0), Retention::Unbounded);
        assert_eq!(Retention::from(-5), Retention::Unbounded);
        assert_eq!(Retention::from(3).limit(), Some(3));
        assert_eq!(Retention::from(i64::MAX).limit(), Some(u32::MAX));
    }

    #[test]
    fn test_recorded_at_parses_sqlite_timestamp() {
        let sample = sample_at("2024-03-01 12:34:56");
        let at = sample.recorded_at().unwrap();
        assert_eq!(at.year(), 2024);
        assert_eq!(u8::from(at.month()), 3);
        assert_eq!(at.hour(), 12);
        assert_eq!(at.second(), 56);
        assert_eq!(at.offset(), time::UtcOffset::UTC);
    }

    #[test]
    fn test_recorded_at_rejects_other_shapes() {
        assert!(sample_at("yesterday").recorded_at().is_none());
        assert!(sample_at("").recorded_at().is_none());
    }

    #[test]
    fn test_mode_display_and_writability() {
        assert_eq!(Mode::Producer.to_string(), "producer");
        assert_eq!(Mode::Consumer.to_string(), "consumer");
        assert!(Mode::Producer.is_writable());
        assert!(!Mode::Consumer.is_writable());
    }

    #[test]
    fn test_mode_must_be_named() {
        let mode: Mode = serde_json::from_str("\"consumer\"").unwrap();
        assert_eq!(mode, Mode::Consumer);
        assert!(serde_json::from_str::<Mode>("\"writer\"").is_err());
        assert!(serde_json::from_str::<Mode>("null").is_err());
    }

    #[test]
    fn test_sample_reading_roundtrip() {
        let sample = sample_at("2024-03-01 12:34:56");
        assert_eq!(sample.reading(), Reading::new(21.0, 1000.0, 20.5, 48.0));
    }
}
