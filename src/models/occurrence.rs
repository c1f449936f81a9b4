//! Session-occurrence calculation.
//!
//! Reconstructs, for any date range, which calendar dates a class *should*
//! have met on, by walking the range day by day against the class's weekly
//! schedule. Sessions scheduled later today are excluded: a date counts only
//! once its block's start instant has passed.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::schedule::{ScheduleBlock, WeeklySchedule};
use super::time::ReferenceClock;

/// Lazy iterator over `(date, block)` session occurrences.
///
/// Finite and restartable; bounded by the number of elapsed days in the
/// range, so materializing it fully is always safe.
pub struct Occurrences<'a> {
    schedule: &'a WeeklySchedule,
    clock: ReferenceClock,
    now: DateTime<Utc>,
    cursor: NaiveDate,
    last: NaiveDate,
}

/// Enumerate session occurrences between `start` and `end` (both instants),
/// never looking past `now`.
///
/// Walks every local calendar date from `start`'s date to
/// `min(end, now)`'s date inclusive. A date is an occurrence iff the
/// schedule has a block meeting on its weekday (first match wins) and that
/// block's start instant on the date is not after `now` — the boundary is
/// inclusive, a session starting exactly at `now` counts.
///
/// `end` is typically `None`, meaning "up to now".
pub fn occurrences<'a>(
    schedule: &'a WeeklySchedule,
    clock: &ReferenceClock,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Occurrences<'a> {
    let horizon = match end {
        Some(end) => end.min(now),
        None => now,
    };
    Occurrences {
        schedule,
        clock: *clock,
        now,
        cursor: clock.local_date(start),
        last: clock.local_date(horizon),
    }
}

/// Number of session occurrences in the range (see [`occurrences`]).
pub fn expected_sessions(
    schedule: &WeeklySchedule,
    clock: &ReferenceClock,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> usize {
    occurrences(schedule, clock, start, None, now).count()
}

impl<'a> Iterator for Occurrences<'a> {
    type Item = (NaiveDate, &'a ScheduleBlock);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor <= self.last {
            let date = self.cursor;
            self.cursor = date.succ_opt()?;

            if let Some(block) = self.schedule.block_for(date.weekday()) {
                let session_start = self.clock.instant_at(date, block.start_time);
                if session_start <= self.now {
                    return Some((date, block));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Weekday};

    fn clock() -> ReferenceClock {
        ReferenceClock::from_name("Asia/Bangkok").unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Bangkok wall time expressed as a UTC instant.
    fn wall(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        clock().instant_at(
            NaiveDate::from_ymd_opt(y, mo, d).unwrap(),
            time(h, mi),
        )
    }

    fn mondays_only() -> WeeklySchedule {
        WeeklySchedule::single(ScheduleBlock::new(
            vec![Weekday::Mon],
            time(9, 0),
            time(10, 0),
            15,
        ))
    }

    #[test]
    fn test_empty_schedule_yields_nothing() {
        let schedule = WeeklySchedule::new(vec![]);
        let start = wall(2025, 3, 3, 0, 0);
        let now = wall(2025, 3, 31, 12, 0);
        assert_eq!(occurrences(&schedule, &clock(), start, None, now).count(), 0);
    }

    #[test]
    fn test_three_mondays_before_current_session_starts() {
        // Class created Monday 2025-03-03; now = Monday 2025-03-24 08:00,
        // one hour before that day's session. Only the three prior Mondays
        // count.
        let schedule = mondays_only();
        let start = wall(2025, 3, 3, 8, 0);
        let now = wall(2025, 3, 24, 8, 0);

        let dates: Vec<NaiveDate> = occurrences(&schedule, &clock(), start, None, now)
            .map(|(date, _)| date)
            .collect();

        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 17).unwrap(),
            ]
        );
    }

    #[test]
    fn test_session_starting_exactly_now_counts() {
        let schedule = mondays_only();
        let start = wall(2025, 3, 3, 8, 0);
        let now = wall(2025, 3, 24, 9, 0); // exactly at start_time

        assert_eq!(expected_sessions(&schedule, &clock(), start, now), 4);
    }

    #[test]
    fn test_never_includes_date_with_future_start() {
        let schedule = mondays_only();
        let start = wall(2025, 3, 3, 8, 0);
        let now = wall(2025, 3, 24, 8, 59);

        for (date, block) in occurrences(&schedule, &clock(), start, None, now) {
            assert!(clock().instant_at(date, block.start_time) <= now);
        }
        assert_eq!(expected_sessions(&schedule, &clock(), start, now), 3);
    }

    #[test]
    fn test_start_after_now_is_empty() {
        let schedule = mondays_only();
        let start = wall(2025, 4, 7, 0, 0);
        let now = wall(2025, 3, 24, 12, 0);
        assert_eq!(occurrences(&schedule, &clock(), start, None, now).count(), 0);
    }

    #[test]
    fn test_explicit_end_caps_range() {
        let schedule = mondays_only();
        let start = wall(2025, 3, 3, 8, 0);
        let end = wall(2025, 3, 10, 23, 0);
        let now = wall(2025, 3, 31, 12, 0);

        let count = occurrences(&schedule, &clock(), start, Some(end), now).count();
        assert_eq!(count, 2); // 03-03 and 03-10
    }

    #[test]
    fn test_restartable() {
        let schedule = mondays_only();
        let start = wall(2025, 3, 3, 8, 0);
        let now = wall(2025, 3, 31, 12, 0);

        let first: Vec<_> = occurrences(&schedule, &clock(), start, None, now)
            .map(|(d, _)| d)
            .collect();
        let second: Vec<_> = occurrences(&schedule, &clock(), start, None, now)
            .map(|(d, _)| d)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_multi_day_block() {
        let schedule = WeeklySchedule::single(ScheduleBlock::new(
            vec![Weekday::Mon, Weekday::Wed],
            time(9, 0),
            time(10, 0),
            0,
        ));
        let start = wall(2025, 3, 3, 0, 0);
        let now = wall(2025, 3, 9, 23, 0); // Sunday end of week

        assert_eq!(expected_sessions(&schedule, &clock(), start, now), 2);
    }

    #[test]
    fn test_two_blocks_same_weekday_counted_once() {
        // Documented limitation: only the first matching block per date is
        // used, a weekday covered twice still yields one occurrence.
        let schedule = WeeklySchedule::new(vec![
            ScheduleBlock::new(vec![Weekday::Mon], time(9, 0), time(10, 0), 0),
            ScheduleBlock::new(vec![Weekday::Mon], time(14, 0), time(15, 0), 0),
        ]);
        let start = wall(2025, 3, 3, 0, 0);
        let now = wall(2025, 3, 3, 23, 0);

        assert_eq!(expected_sessions(&schedule, &clock(), start, now), 1);
    }

    #[test]
    fn test_creation_moment_uses_local_date() {
        // Class created 2025-03-03 18:30 UTC = 2025-03-04 01:30 Bangkok
        // (a Tuesday); the Monday 03-03 must not count.
        let schedule = mondays_only();
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 18, 30, 0).unwrap();
        let now = wall(2025, 3, 10, 12, 0);

        let dates: Vec<_> = occurrences(&schedule, &clock(), start, None, now)
            .map(|(d, _)| d)
            .collect();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()]);
    }
}
