//! Data-driven tests for the occurrence calculator.

mod support;

use chrono::Weekday;

use ats_rust::models::{occurrence::expected_sessions, ScheduleBlock, WeeklySchedule};

use support::{clock, time, wall};

struct Case {
    name: &'static str,
    days: &'static [Weekday],
    start: (u32, u32),
    end: (u32, u32),
    // (day-of-month in March 2025, hour, minute)
    created: (u32, u32, u32),
    now: (u32, u32, u32),
    expected: usize,
}

#[test]
fn test_expected_session_counts() {
    // March 2025: the 3rd is a Monday, the 31st the fifth Monday
    let cases = [
        Case {
            name: "three full weeks, before current session",
            days: &[Weekday::Mon],
            start: (9, 0),
            end: (10, 0),
            created: (3, 8, 0),
            now: (24, 8, 0),
            expected: 3,
        },
        Case {
            name: "current session counted once started",
            days: &[Weekday::Mon],
            start: (9, 0),
            end: (10, 0),
            created: (3, 8, 0),
            now: (24, 9, 0),
            expected: 4,
        },
        Case {
            name: "twice-weekly class",
            days: &[Weekday::Mon, Weekday::Thu],
            start: (13, 0),
            end: (14, 30),
            created: (3, 8, 0),
            now: (16, 23, 0), // Sunday after two full weeks
            expected: 4,
        },
        Case {
            name: "created mid-week skips earlier weekday",
            days: &[Weekday::Mon],
            start: (9, 0),
            end: (10, 0),
            created: (5, 8, 0), // Wednesday
            now: (16, 23, 0),
            expected: 1, // only the 10th
        },
        Case {
            name: "same-day creation before start",
            days: &[Weekday::Mon],
            start: (9, 0),
            end: (10, 0),
            created: (3, 7, 0),
            now: (3, 12, 0),
            expected: 1,
        },
        Case {
            name: "same-day creation, session not started yet",
            days: &[Weekday::Mon],
            start: (15, 0),
            end: (16, 0),
            created: (3, 7, 0),
            now: (3, 12, 0),
            expected: 0,
        },
        Case {
            name: "weekend-only class",
            days: &[Weekday::Sat, Weekday::Sun],
            start: (10, 0),
            end: (12, 0),
            created: (3, 8, 0),
            now: (17, 8, 0), // Monday after two weekends
            expected: 4,
        },
    ];

    for case in &cases {
        let schedule = WeeklySchedule::single(ScheduleBlock::new(
            case.days.to_vec(),
            time(case.start.0, case.start.1),
            time(case.end.0, case.end.1),
            15,
        ));
        let created = wall(2025, 3, case.created.0, case.created.1, case.created.2);
        let now = wall(2025, 3, case.now.0, case.now.1, case.now.2);

        assert_eq!(
            expected_sessions(&schedule, &clock(), created, now),
            case.expected,
            "case '{}'",
            case.name
        );
    }
}
