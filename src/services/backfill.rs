//! Absence backfill.
//!
//! Inserts Absent records for enrolled students who never checked in on a
//! session date, so later reconciliation and per-date views see an explicit
//! row. Backfill goes through the same day-slot uniqueness as live
//! check-ins: losing a race to a late-arriving check-in is silent, the live
//! record always wins.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use futures::future::join_all;
use log::{info, warn};
use uuid::Uuid;

use crate::api::{AttendanceRecord, AttendanceStatus, Class, ClassId, ReferenceClock};
use crate::db::repository::FullRepository;
use crate::services::{fetch_class, ServiceError};

/// Insert Absent records for one class and date.
///
/// The date must be a session day whose session has already ended;
/// backfilling a session still in progress would mark students absent who
/// may yet check in. Inserted records are timestamped at the block's end
/// instant on that date.
///
/// # Returns
/// Number of records inserted (students already recorded, and races lost to
/// live check-ins, are skipped).
pub async fn backfill_class_date<R: FullRepository + ?Sized>(
    repo: &R,
    clock: &ReferenceClock,
    class_id: ClassId,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<usize, ServiceError> {
    let class = fetch_class(repo, class_id).await?;
    backfill_fetched_class(repo, clock, &class, date, now).await
}

async fn backfill_fetched_class<R: FullRepository + ?Sized>(
    repo: &R,
    clock: &ReferenceClock,
    class: &Class,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<usize, ServiceError> {
    let class_id = match class.id {
        Some(id) => id,
        None => return Ok(0),
    };

    let block = class
        .schedule
        .block_for(date.weekday())
        .ok_or(ServiceError::NoSessionOnDate {
            date,
            weekday: date.weekday(),
        })?;

    let session_end = clock.instant_at(date, block.end_time);
    if now < session_end {
        return Err(ServiceError::SessionNotFinished { date });
    }

    let students = repo.students_for_class(class_id).await?;
    let existing = repo.records_for_class_on(class_id, date).await?;
    let recorded: std::collections::HashSet<_> =
        existing.iter().map(|r| r.student_id).collect();

    let mut inserted = 0;
    for student in &students {
        let student_id = match student.id {
            Some(id) => id,
            None => continue,
        };
        if recorded.contains(&student_id) {
            continue;
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            student_id,
            class_id,
            status: AttendanceStatus::Absent,
            timestamp: session_end,
            local_day: date,
            location: None,
            location_status: None,
            photo_checksum: None,
        };

        match repo.insert_record(&record).await {
            Ok(_) => inserted += 1,
            // A live check-in claimed the slot between our read and this
            // insert; theirs stands.
            Err(e) if e.is_conflict() => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        "Backfilled {} absences for class {} on {}",
        inserted, class_id, date
    );
    Ok(inserted)
}

/// Backfill today's finished sessions across all classes.
///
/// Classes without a session today, or whose session has not ended yet, are
/// skipped. Returns the total number of Absent records inserted. Safe to run
/// repeatedly: every insert goes through the day-slot uniqueness.
pub async fn sweep_absences<R: FullRepository + ?Sized>(
    repo: &R,
    clock: &ReferenceClock,
    now: DateTime<Utc>,
) -> Result<usize, ServiceError> {
    let classes = repo.list_classes().await?;
    let today = clock.local_date(now);

    let due: Vec<&Class> = classes
        .iter()
        .filter(|class| {
            class
                .schedule
                .block_for(today.weekday())
                .map(|block| now >= clock.instant_at(today, block.end_time))
                .unwrap_or(false)
        })
        .collect();

    let results = join_all(
        due.iter()
            .map(|class| backfill_fetched_class(repo, clock, class, today, now)),
    )
    .await;

    let mut total = 0;
    for (class, result) in due.iter().zip(results) {
        match result {
            Ok(count) => total += count,
            Err(e) => warn!(
                "Absence sweep failed for class {}: {}",
                class.id.map(|id| id.to_string()).unwrap_or_default(),
                e
            ),
        }
    }

    info!(
        "Absence sweep over {} due classes inserted {} records",
        due.len(),
        total
    );
    Ok(total)
}
