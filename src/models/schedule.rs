//! Weekly class schedules.
//!
//! A class meets according to a [`WeeklySchedule`]: an ordered list of
//! [`ScheduleBlock`]s, each pairing a set of weekdays with a wall-clock time
//! window and a late allowance. When more than one block covers the same
//! weekday, the first block in list order wins for status classification —
//! blocks are never merged.

use chrono::{Duration, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Schedule validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule block has no weekdays")]
    EmptyDays,
    #[error("schedule block time window is empty or inverted ({start} >= {end})")]
    InvalidTimeWindow { start: NaiveTime, end: NaiveTime },
    #[error("late allowance must not be negative (got {0} minutes)")]
    NegativeLateAllowance(i64),
    #[error("schedule has no blocks")]
    NoBlocks,
}

/// One recurring weekly day-set + time window for a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    /// Weekdays on which this block meets, in declaration order
    #[serde(with = "weekday_list")]
    pub days: Vec<Weekday>,
    /// Session start, wall-clock time in the reference zone
    #[serde(with = "wall_time")]
    pub start_time: NaiveTime,
    /// Session end, wall-clock time in the reference zone
    #[serde(with = "wall_time")]
    pub end_time: NaiveTime,
    /// Grace period after start during which a check-in is still on time
    #[serde(default)]
    pub late_allowance_minutes: i64,
}

impl ScheduleBlock {
    pub fn new(
        days: Vec<Weekday>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        late_allowance_minutes: i64,
    ) -> Self {
        Self {
            days,
            start_time,
            end_time,
            late_allowance_minutes,
        }
    }

    /// Whether this block meets on the given weekday.
    pub fn meets_on(&self, weekday: Weekday) -> bool {
        self.days.contains(&weekday)
    }

    pub fn late_allowance(&self) -> Duration {
        Duration::minutes(self.late_allowance_minutes)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.days.is_empty() {
            return Err(ScheduleError::EmptyDays);
        }
        if self.start_time >= self.end_time {
            return Err(ScheduleError::InvalidTimeWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.late_allowance_minutes < 0 {
            return Err(ScheduleError::NegativeLateAllowance(
                self.late_allowance_minutes,
            ));
        }
        Ok(())
    }
}

/// A class's full recurring weekly schedule.
///
/// Deserializes from either a list of blocks or a single bare block (the
/// historical single-block wire form).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    pub blocks: Vec<ScheduleBlock>,
}

impl WeeklySchedule {
    pub fn new(blocks: Vec<ScheduleBlock>) -> Self {
        Self { blocks }
    }

    /// Schedule with one block (the common case).
    pub fn single(block: ScheduleBlock) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// First block (in list order) meeting on the given weekday.
    ///
    /// `None` means no class session that day. When several blocks cover the
    /// weekday only the first is returned; callers must not merge blocks.
    pub fn block_for(&self, weekday: Weekday) -> Option<&ScheduleBlock> {
        self.blocks.iter().find(|block| block.meets_on(weekday))
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.blocks.is_empty() {
            return Err(ScheduleError::NoBlocks);
        }
        for block in &self.blocks {
            block.validate()?;
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for WeeklySchedule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Many(Vec<ScheduleBlock>),
            One(ScheduleBlock),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Many(blocks) => WeeklySchedule::new(blocks),
            Repr::One(block) => WeeklySchedule::single(block),
        })
    }
}

/// Serde adapter for weekday sets.
///
/// Serializes as a list of lowercase day names. Accepts either a list of day
/// names or the historical comma-separated string form
/// (`"monday, wednesday"`); names may be full or three-letter, any case.
mod weekday_list {
    use chrono::Weekday;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn day_name(weekday: Weekday) -> &'static str {
        match weekday {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        }
    }

    pub fn serialize<S>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(days.iter().map(|d| day_name(*d)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Weekday>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<String>),
            Csv(String),
        }

        let names: Vec<String> = match Repr::deserialize(deserializer)? {
            Repr::List(list) => list,
            Repr::Csv(csv) => csv.split(',').map(|s| s.to_string()).collect(),
        };

        names
            .iter()
            .map(|name| {
                let trimmed = name.trim();
                trimmed
                    .parse::<Weekday>()
                    .map_err(|_| D::Error::custom(format!("invalid weekday '{}'", trimmed)))
            })
            .collect()
    }
}

/// Serde adapter for wall-clock times in the original `"HH:MM"` wire form.
///
/// `"HH:MM:SS"` is accepted on input; output keeps seconds only when nonzero.
mod wall_time {
    use chrono::{NaiveTime, Timelike};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M:%S"))
            .map_err(|_| D::Error::custom(format!("invalid wall-clock time '{}'", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday_block() -> ScheduleBlock {
        ScheduleBlock::new(vec![Weekday::Mon], time(9, 0), time(10, 0), 15)
    }

    #[test]
    fn test_block_meets_on() {
        let block = monday_block();
        assert!(block.meets_on(Weekday::Mon));
        assert!(!block.meets_on(Weekday::Tue));
    }

    #[test]
    fn test_block_validate_ok() {
        assert!(monday_block().validate().is_ok());
    }

    #[test]
    fn test_block_validate_empty_days() {
        let block = ScheduleBlock::new(vec![], time(9, 0), time(10, 0), 0);
        assert_eq!(block.validate(), Err(ScheduleError::EmptyDays));
    }

    #[test]
    fn test_block_validate_inverted_window() {
        let block = ScheduleBlock::new(vec![Weekday::Mon], time(10, 0), time(9, 0), 0);
        assert!(matches!(
            block.validate(),
            Err(ScheduleError::InvalidTimeWindow { .. })
        ));
    }

    #[test]
    fn test_block_validate_negative_allowance() {
        let block = ScheduleBlock::new(vec![Weekday::Mon], time(9, 0), time(10, 0), -5);
        assert_eq!(
            block.validate(),
            Err(ScheduleError::NegativeLateAllowance(-5))
        );
    }

    #[test]
    fn test_first_matching_block_wins() {
        let early = ScheduleBlock::new(vec![Weekday::Mon], time(9, 0), time(10, 0), 15);
        let late = ScheduleBlock::new(vec![Weekday::Mon], time(14, 0), time(15, 0), 15);
        let schedule = WeeklySchedule::new(vec![early.clone(), late]);

        let found = schedule.block_for(Weekday::Mon).unwrap();
        assert_eq!(found, &early);
    }

    #[test]
    fn test_no_block_for_off_day() {
        let schedule = WeeklySchedule::single(monday_block());
        assert!(schedule.block_for(Weekday::Sun).is_none());
    }

    #[test]
    fn test_empty_schedule_validation_fails() {
        let schedule = WeeklySchedule::new(vec![]);
        assert_eq!(schedule.validate(), Err(ScheduleError::NoBlocks));
    }

    #[test]
    fn test_deserialize_block_with_day_list() {
        let json = r#"{
            "days": ["monday", "Wed"],
            "start_time": "09:00",
            "end_time": "10:30",
            "late_allowance_minutes": 15
        }"#;

        let block: ScheduleBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.days, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(block.start_time, time(9, 0));
        assert_eq!(block.end_time, time(10, 30));
        assert_eq!(block.late_allowance_minutes, 15);
    }

    #[test]
    fn test_deserialize_block_with_csv_days() {
        // Historical wire form: comma-separated day names
        let json = r#"{
            "days": "monday, wednesday,Friday",
            "start_time": "13:00",
            "end_time": "14:00"
        }"#;

        let block: ScheduleBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.days, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(block.late_allowance_minutes, 0);
    }

    #[test]
    fn test_deserialize_rejects_unknown_day() {
        let json = r#"{
            "days": ["funday"],
            "start_time": "09:00",
            "end_time": "10:00"
        }"#;

        assert!(serde_json::from_str::<ScheduleBlock>(json).is_err());
    }

    #[test]
    fn test_deserialize_time_with_seconds() {
        let json = r#"{
            "days": ["monday"],
            "start_time": "09:00:30",
            "end_time": "10:00"
        }"#;

        let block: ScheduleBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.start_time, NaiveTime::from_hms_opt(9, 0, 30).unwrap());
    }

    #[test]
    fn test_serialize_round_trip() {
        let schedule = WeeklySchedule::single(monday_block());
        let json = serde_json::to_string(&schedule).unwrap();
        let back: WeeklySchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, back);
    }

    #[test]
    fn test_deserialize_single_block_schedule() {
        // Historical single-block wire form, no surrounding array
        let json = r#"{
            "days": "tuesday,thursday",
            "start_time": "08:00",
            "end_time": "09:30",
            "late_allowance_minutes": 10
        }"#;

        let schedule: WeeklySchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.blocks.len(), 1);
        assert_eq!(
            schedule.blocks[0].days,
            vec![Weekday::Tue, Weekday::Thu]
        );
    }

    #[test]
    fn test_deserialize_block_list_schedule() {
        let json = r#"[
            {"days": ["monday"], "start_time": "09:00", "end_time": "10:00"},
            {"days": ["thursday"], "start_time": "14:00", "end_time": "16:00"}
        ]"#;

        let schedule: WeeklySchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.blocks.len(), 2);
        assert!(schedule.block_for(Weekday::Thu).is_some());
    }
}
