//! Domain model types: reference-zone time handling, weekly schedules and
//! session-occurrence calculation.

pub mod occurrence;
pub mod schedule;
pub mod time;

pub use occurrence::{occurrences, Occurrences};
pub use schedule::{ScheduleBlock, ScheduleError, WeeklySchedule};
pub use time::{InvalidTimeZone, ReferenceClock, DEFAULT_TIMEZONE};
