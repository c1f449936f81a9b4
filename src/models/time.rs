//! Reference-zone time handling.
//!
//! Every "which day is today" and "day boundary" decision in the engine goes
//! through [`ReferenceClock`], which pins a single IANA time zone for the
//! whole deployment. Stored timestamps are always UTC instants; the zone
//! enters only when an instant is projected onto a local calendar date,
//! weekday or wall-clock time.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::*;

/// Zone used when no configuration is supplied.
pub const DEFAULT_TIMEZONE: &str = "Asia/Bangkok";

/// Error for an unrecognized IANA zone name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid time zone '{name}': {reason}")]
pub struct InvalidTimeZone {
    pub name: String,
    pub reason: String,
}

/// Fixed reference time zone for day boundaries and weekday resolution.
///
/// Local-time resolution policy: an ambiguous wall time (clocks rolled back)
/// maps to the earliest matching instant; a nonexistent wall time (clocks
/// rolled forward) maps to the same wall time one hour later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceClock {
    zone: Tz,
}

impl ReferenceClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Resolve an IANA zone name (e.g. `"Asia/Bangkok"`).
    pub fn from_name(name: &str) -> Result<Self, InvalidTimeZone> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|e| InvalidTimeZone {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Project an instant into the reference zone.
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.zone)
    }

    /// Calendar date of an instant in the reference zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.to_local(instant).date_naive()
    }

    /// Weekday of an instant in the reference zone.
    pub fn weekday(&self, instant: DateTime<Utc>) -> Weekday {
        use chrono::Datelike;
        self.to_local(instant).weekday()
    }

    /// Absolute instant of a wall-clock time on a calendar date.
    pub fn instant_at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let wall = date.and_time(time);
        match self.zone.from_local_datetime(&wall) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                // Wall time falls in a DST gap; take the same wall time one
                // hour later. A double gap does not occur in real zones.
                let shifted = wall + Duration::hours(1);
                self.zone
                    .from_local_datetime(&shifted)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| Utc.from_utc_datetime(&shifted))
            }
        }
    }

    /// Half-open `[local-midnight, next-local-midnight)` window of a date.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let midnight = NaiveTime::MIN;
        let start = self.instant_at(date, midnight);
        let end = match date.succ_opt() {
            Some(next) => self.instant_at(next, midnight),
            None => start + Duration::days(1),
        };
        (start, end)
    }
}

impl Default for ReferenceClock {
    fn default() -> Self {
        // DEFAULT_TIMEZONE is a valid IANA name, checked by tests below.
        Self::from_name(DEFAULT_TIMEZONE).unwrap_or_else(|_| Self::new(Tz::UTC))
    }
}
