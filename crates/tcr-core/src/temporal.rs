//! # Temporal Types — UTC Timestamps and Clocks
//!
//! Every deadline in the registry and the arbitrator (challenge period,
//! voting window, reveal window, appeal window) is expressed as a
//! [`Timestamp`] truncated to whole seconds, so window arithmetic is exact
//! and canonical bytes stay deterministic.
//!
//! Components never call `Utc::now()` directly. They read time through a
//! [`Clock`], which lets tests and the simulator drive time explicitly with
//! a [`ManualClock`].

use chrono::{DateTime, Duration, Timelike, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// From a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CoreError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| CoreError::InvalidTimestamp(format!("unix seconds out of range: {secs}")))?;
        Ok(Self(dt))
    }

    /// Parse an RFC 3339 string with a `Z` suffix.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// `self + secs`, clamped to the latest representable instant.
    pub fn saturating_add_secs(&self, secs: u64) -> Self {
        let shifted = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| self.0.checked_add_signed(d));
        Self(shifted.unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// `self - secs`, clamped to the earliest representable instant.
    pub fn saturating_sub_secs(&self, secs: u64) -> Self {
        let shifted = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| self.0.checked_sub_signed(d));
        Self(shifted.unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Whole seconds elapsed from `earlier` to `self`; zero if `earlier`
    /// is in the future.
    pub fn secs_since(&self, earlier: &Timestamp) -> u64 {
        let delta = self.epoch_secs().saturating_sub(earlier.epoch_secs());
        u64::try_from(delta).unwrap_or(0)
    }

    /// ISO8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    /// Start the clock at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move time forward by `secs`.
    pub fn advance(&self, secs: u64) {
        let mut now = self.now.lock();
        *now = now.saturating_add_secs(secs);
    }

    /// Jump to an absolute instant (forwards or backwards).
    pub fn set(&self, at: Timestamp) {
        *self.now.lock() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.as_datetime().nanosecond(), 0);
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-01-15T12:00:00Z").is_ok());
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("garbage").is_err());
    }

    #[test]
    fn second_arithmetic() {
        let t = at(1_000);
        assert_eq!(t.saturating_add_secs(50).epoch_secs(), 1_050);
        assert_eq!(t.saturating_sub_secs(1).epoch_secs(), 999);
        assert_eq!(at(1_050).secs_since(&t), 50);
        assert_eq!(t.secs_since(&at(1_050)), 0);
    }

    #[test]
    fn add_saturates_at_max() {
        let t = at(0).saturating_add_secs(u64::MAX);
        assert_eq!(*t.as_datetime(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(at(100));
        assert_eq!(clock.now().epoch_secs(), 100);
        clock.advance(25);
        assert_eq!(clock.now().epoch_secs(), 125);
        clock.set(at(10));
        assert_eq!(clock.now().epoch_secs(), 10);
    }

    #[test]
    fn system_clock_has_no_subseconds() {
        assert_eq!(SystemClock.now().as_datetime().nanosecond(), 0);
    }
}
