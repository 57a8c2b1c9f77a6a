//! Fixed-length time buckets.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeDelta, TimeZone, Utc};
use std::str::FromStr;
use std::time::Duration;

use crate::ConfigError;

const SECONDS_PER_DAY: u32 = 86_400;

/// Length of one aggregation bucket.
///
/// Always a positive number of whole seconds that evenly divides one day, so
/// bucket boundaries line up with midnight in the bucket zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketLength {
    seconds: u32,
}

impl BucketLength {
    /// Thirty-second buckets starting at `:00` and `:30` of every minute.
    pub const THIRTY_SECONDS: Self = Self { seconds: 30 };

    /// Creates a bucket length from a duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration is zero, has a sub-second part, or
    /// does not evenly divide one day.
    pub fn new(length: Duration) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidBucketLength {
            millis: length.as_millis(),
        };

        if length.subsec_nanos() != 0 {
            return Err(invalid());
        }
        let seconds = u32::try_from(length.as_secs()).map_err(|_| invalid())?;
        if seconds == 0 || SECONDS_PER_DAY % seconds != 0 {
            return Err(invalid());
        }
        Ok(Self { seconds })
    }

    /// Creates a bucket length from a number of seconds.
    ///
    /// # Errors
    ///
    /// See [`BucketLength::new`].
    pub fn from_secs(seconds: u64) -> Result<Self, ConfigError> {
        Self::new(Duration::from_secs(seconds))
    }

    /// Returns the length in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Returns the length in milliseconds.
    #[must_use]
    pub const fn millis(&self) -> i64 {
        self.seconds as i64 * 1000
    }

    /// Returns the length as a standard duration.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.seconds as u64)
    }

    /// Returns the length as a chrono time delta.
    #[must_use]
    pub fn as_time_delta(&self) -> TimeDelta {
        TimeDelta::seconds(self.seconds as i64)
    }
}

impl Default for BucketLength {
    fn default() -> Self {
        Self::THIRTY_SECONDS
    }
}

impl std::fmt::Display for BucketLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.seconds)
    }
}

/// Time zone in which bucket boundaries and bar times are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketZone {
    /// Coordinated Universal Time.
    Utc,
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl BucketZone {
    /// Returns the zone's offset from UTC, in seconds, at the given instant.
    #[must_use]
    pub fn utc_offset_seconds(&self, at: DateTime<Utc>) -> i32 {
        match self {
            Self::Utc => 0,
            Self::Local => Local
                .offset_from_utc_datetime(&at.naive_utc())
                .fix()
                .local_minus_utc(),
            Self::Fixed(offset) => offset.local_minus_utc(),
        }
    }

    /// Converts an instant into this zone.
    #[must_use]
    pub fn to_zoned(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset =
            FixedOffset::east_opt(self.utc_offset_seconds(at)).unwrap_or_else(|| Utc.fix());
        at.with_timezone(&offset)
    }

    /// Formats an instant as `HH:MM:SS` wall-clock time in this zone.
    #[must_use]
    pub fn format_hms(&self, at: DateTime<Utc>) -> String {
        self.to_zoned(at).format("%H:%M:%S").to_string()
    }
}

impl std::fmt::Display for BucketZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utc => write!(f, "utc"),
            Self::Local => write!(f, "local"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for BucketZone {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utc" | "z" | "gmt" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            other => parse_offset(other)
                .map(Self::Fixed)
                .ok_or_else(|| ZoneParseError(s.to_string())),
        }
    }
}

/// Parses `+HH`, `+HHMM` or `+HH:MM` (and the `-` forms) into an offset.
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Error returned when parsing an invalid bucket zone string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneParseError(String);

impl std::fmt::Display for ZoneParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid zone '{}', expected one of: utc, local, or an offset such as +05:30",
            self.0
        )
    }
}

impl std::error::Error for ZoneParseError {}

/// Maps timestamps to the start of their fixed-length bucket.
///
/// A timestamp is decomposed in the configured zone, its seconds-of-day are
/// floored to a multiple of the bucket length, and the sub-second part is
/// dropped. With the default 30 second length, `10:01:15` maps to
/// `10:01:00` and `10:01:42` maps to `10:01:30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketClock {
    length: BucketLength,
    zone: BucketZone,
}

impl BucketClock {
    /// Creates a clock with the given bucket length and zone.
    #[must_use]
    pub const fn new(length: BucketLength, zone: BucketZone) -> Self {
        Self { length, zone }
    }

    /// Creates a clock that computes boundaries in UTC.
    #[must_use]
    pub const fn utc(length: BucketLength) -> Self {
        Self::new(length, BucketZone::Utc)
    }

    /// Returns the bucket length.
    #[must_use]
    pub const fn length(&self) -> BucketLength {
        self.length
    }

    /// Returns the zone boundaries are computed in.
    #[must_use]
    pub const fn zone(&self) -> BucketZone {
        self.zone
    }

    /// Returns the start of the bucket containing `timestamp`.
    ///
    /// A timestamp in the partial bucket at the very start of chrono's range
    /// maps to the first whole bucket, so the result is always aligned.
    #[must_use]
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let into_bucket = self.offset_into_bucket_millis(timestamp);
        timestamp
            .checked_sub_signed(TimeDelta::milliseconds(into_bucket))
            .or_else(|| {
                timestamp.checked_add_signed(TimeDelta::milliseconds(
                    self.length.millis() - into_bucket,
                ))
            })
            .unwrap_or(timestamp)
    }

    /// Returns the start of the bucket containing an epoch-millisecond
    /// timestamp, as epoch milliseconds.
    ///
    /// Timestamps outside chrono's representable range are bucketed on UTC
    /// boundaries.
    #[must_use]
    pub fn bucket_start_millis(&self, timestamp_ms: i64) -> i64 {
        let into_bucket = DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
            || timestamp_ms.rem_euclid(self.length.millis()),
            |ts| self.offset_into_bucket_millis(ts),
        );
        timestamp_ms.saturating_sub(into_bucket)
    }

    /// Milliseconds between the bucket start and `timestamp`.
    fn offset_into_bucket_millis(&self, timestamp: DateTime<Utc>) -> i64 {
        let offset_ms = i64::from(self.zone.utc_offset_seconds(timestamp)) * 1000;
        (timestamp.timestamp_millis() + offset_ms).rem_euclid(self.length.millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(hour: u32, minute: u32, second: u32, millis: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, hour, minute, second).unwrap()
            + TimeDelta::milliseconds(millis)
    }

    fn clock() -> BucketClock {
        BucketClock::utc(BucketLength::THIRTY_SECONDS)
    }

    #[test]
    fn test_floors_to_half_minute() {
        let clock = clock();
        assert_eq!(clock.bucket_start(at(10, 1, 15, 0)), at(10, 1, 0, 0));
        assert_eq!(clock.bucket_start(at(10, 1, 42, 0)), at(10, 1, 30, 0));
        assert_eq!(clock.bucket_start(at(10, 1, 29, 999)), at(10, 1, 0, 0));
        assert_eq!(clock.bucket_start(at(10, 1, 30, 0)), at(10, 1, 30, 0));
        assert_eq!(clock.bucket_start(at(23, 59, 59, 999)), at(23, 59, 30, 0));
    }

    #[test]
    fn test_bucket_start_properties() {
        let clock = clock();
        let base = at(0, 0, 0, 0).timestamp_millis();

        for step in 0..5_000i64 {
            let ms = base + step * 7_919;
            let start = clock.bucket_start_millis(ms);

            assert!(start <= ms);
            assert!(ms - start < clock.length().millis());
            assert_eq!(start.rem_euclid(clock.length().millis()), 0);
            assert_eq!(clock.bucket_start_millis(start), start);
        }
    }

    #[test]
    fn test_millis_and_datetime_agree() {
        let clock = clock();
        let ts = at(14, 37, 45, 123);
        assert_eq!(
            clock.bucket_start(ts).timestamp_millis(),
            clock.bucket_start_millis(ts.timestamp_millis())
        );
    }

    #[test]
    fn test_negative_timestamps_floor_down() {
        let clock = clock();
        assert_eq!(clock.bucket_start_millis(-1), -30_000);
        assert_eq!(clock.bucket_start_millis(-30_000), -30_000);
    }

    #[test]
    fn test_extreme_timestamps_are_total() {
        let clock = clock();
        assert!(clock.bucket_start_millis(i64::MIN) <= i64::MIN + 30_000);
        assert!(clock.bucket_start_millis(i64::MAX) <= i64::MAX);
        assert_eq!(
            clock.bucket_start(DateTime::<Utc>::MIN_UTC),
            DateTime::<Utc>::MIN_UTC
        );
    }

    #[test]
    fn test_partial_first_bucket_clamps_to_aligned_start() {
        // With a 15s offset the earliest instant sits halfway into a bucket
        // whose start is not representable.
        let offset = FixedOffset::east_opt(15).unwrap();
        let clock = BucketClock::new(BucketLength::THIRTY_SECONDS, BucketZone::Fixed(offset));

        let start = clock.bucket_start(DateTime::<Utc>::MIN_UTC);
        assert_eq!(start, DateTime::<Utc>::MIN_UTC + TimeDelta::seconds(15));
        assert_eq!(clock.offset_into_bucket_millis(start), 0);
        assert_eq!(clock.bucket_start(start), start);
    }

    #[test]
    fn test_fixed_offset_shifts_alignment() {
        // An offset that is not a whole number of buckets moves the boundaries.
        let offset = FixedOffset::east_opt(15).unwrap();
        let clock = BucketClock::new(BucketLength::THIRTY_SECONDS, BucketZone::Fixed(offset));

        let start = clock.bucket_start(at(10, 1, 20, 0));
        assert_eq!(start, at(10, 1, 15, 0));
        assert_eq!(BucketZone::Fixed(offset).format_hms(start), "10:01:30");
    }

    #[test]
    fn test_whole_hour_offset_keeps_alignment() {
        let utc = clock();
        let shifted = BucketClock::new(
            BucketLength::THIRTY_SECONDS,
            "+05:30".parse::<BucketZone>().unwrap(),
        );
        let ts = at(9, 12, 44, 500);
        assert_eq!(utc.bucket_start(ts), shifted.bucket_start(ts));
    }

    #[test]
    fn test_day_long_buckets_follow_zone_midnight() {
        let zone = "-05:00".parse::<BucketZone>().unwrap();
        let clock = BucketClock::new(BucketLength::from_secs(86_400).unwrap(), zone);

        let start = clock.bucket_start(at(3, 0, 0, 0));
        assert_eq!(zone.to_zoned(start).hour(), 0);
        assert_eq!(start, at(5, 0, 0, 0) - TimeDelta::days(1));
    }

    #[test]
    fn test_bucket_length_validation() {
        assert_eq!(BucketLength::from_secs(30).unwrap().seconds(), 30);
        assert_eq!(BucketLength::from_secs(3600).unwrap().millis(), 3_600_000);
        assert!(BucketLength::from_secs(0).is_err());
        assert!(BucketLength::from_secs(7).is_err());
        assert!(BucketLength::from_secs(172_800).is_err());
        assert!(BucketLength::new(Duration::from_millis(1500)).is_err());
    }

    #[test]
    fn test_zone_parse() {
        assert_eq!("UTC".parse::<BucketZone>().unwrap(), BucketZone::Utc);
        assert_eq!("local".parse::<BucketZone>().unwrap(), BucketZone::Local);
        assert_eq!(
            "+0530".parse::<BucketZone>().unwrap(),
            BucketZone::Fixed(FixedOffset::east_opt(19_800).unwrap())
        );
        assert_eq!(
            "-08".parse::<BucketZone>().unwrap(),
            BucketZone::Fixed(FixedOffset::west_opt(28_800).unwrap())
        );
        assert!("+25:00".parse::<BucketZone>().is_err());
        assert!("mars".parse::<BucketZone>().is_err());
    }

    #[test]
    fn test_format_hms() {
        let ts = at(11, 36, 0, 0);
        assert_eq!(BucketZone::Utc.format_hms(ts), "11:36:00");
        let zone = "+01:00".parse::<BucketZone>().unwrap();
        assert_eq!(zone.format_hms(ts), "12:36:00");
    }
}
