//! Snapshot timestamps and the clock that produces them.

use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// On-disk key format: one-second resolution, e.g. `20240131235959`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Display format used in history listings.
pub const READABLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identity of a snapshot within one version directory.
///
/// Keys read back from `history.json` are kept verbatim even when they do
/// not follow [`TIMESTAMP_FORMAT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Format a point in time as a snapshot key.
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self(at.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Wrap an existing key without validation.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` label back into a key.
    pub fn from_readable(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s.trim(), READABLE_FORMAT)
            .ok()
            .map(Self::from_datetime)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the key, if it follows [`TIMESTAMP_FORMAT`].
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT).ok()
    }

    /// Human-readable form; unparsable keys are returned verbatim.
    pub fn readable(&self) -> String {
        self.to_datetime()
            .map(|at| at.format(READABLE_FORMAT).to_string())
            .unwrap_or_else(|| self.0.clone())
    }

    /// Name of the snapshot file holding this version's content.
    pub fn snapshot_file_name(&self) -> String {
        format!("{}.txt", self.0)
    }

    /// Whether the key can name a file inside a version directory.
    pub(crate) fn is_safe_file_stem(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\\', '\0'])
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

/// Source of the current local time for new snapshots.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn formats_with_second_resolution() {
        let ts = Timestamp::from_datetime(at(7, 5, 3));
        assert_eq!(ts.as_str(), "20240309070503");
        assert_eq!(ts.snapshot_file_name(), "20240309070503.txt");
    }

    #[test]
    fn readable_round_trips_through_label() {
        let ts = Timestamp::from_string("20240309070503");
        assert_eq!(ts.readable(), "2024-03-09 07:05:03");
        assert_eq!(Timestamp::from_readable("2024-03-09 07:05:03"), Some(ts));
    }

    #[test]
    fn readable_falls_back_to_raw_key() {
        let ts = Timestamp::from_string("legacy-key");
        assert_eq!(ts.readable(), "legacy-key");
        assert!(ts.to_datetime().is_none());
        assert!(Timestamp::from_readable("yesterday").is_none());
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        assert!(Timestamp::from_string("20240309070503").is_safe_file_stem());
        assert!(!Timestamp::from_string("../secrets").is_safe_file_stem());
        assert!(!Timestamp::from_string("..").is_safe_file_stem());
        assert!(!Timestamp::from_string("").is_safe_file_stem());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Timestamp::from_string("20240309070503")).unwrap();
        assert_eq!(json, "\"20240309070503\"");
    }

    #[test]
    fn manual_clock_moves_only_on_request() {
        let clock = ManualClock::new(at(10, 0, 0));
        assert_eq!(clock.now(), at(10, 0, 0));
        clock.advance(Duration::seconds(61));
        assert_eq!(clock.now(), at(10, 1, 1));
        clock.set(at(9, 0, 0));
        assert_eq!(clock.now(), at(9, 0, 0));
    }
}
