//! Check-in classification and the mark-attendance state machine.
//!
//! A check-in attempt runs to a terminal outcome in one call: enrollment
//! check, session-day check, duplicate check, face verification (when a
//! photo is supplied), then time classification against the day's schedule
//! block. Exactly one attendance record is persisted per successful attempt;
//! the storage layer's day-slot uniqueness resolves concurrent duplicates.

use chrono::{DateTime, Utc, Weekday};
use log::info;
use uuid::Uuid;

use crate::api::{
    AttendanceRecord, AttendanceStatus, ClassId, GeoPoint, LocationStatus, ReferenceClock,
    ScheduleBlock, StudentId,
};
use crate::db::checksum::photo_fingerprint;
use crate::db::repository::{FullRepository, RepositoryError};
use crate::services::face::{FaceVerifier, FaceVerifyError};

/// One check-in attempt.
#[derive(Debug, Clone)]
pub struct CheckInRequest {
    pub student_id: StudentId,
    pub class_id: ClassId,
    /// The check-in instant; passed explicitly so the engine stays pure
    pub now: DateTime<Utc>,
    /// Base64 photo payload for face verification
    pub photo: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Successful check-in: the stored record plus display context.
#[derive(Debug, Clone)]
pub struct CheckInOutcome {
    pub record: AttendanceRecord,
    pub class_name: String,
    /// The schedule block the check-in was classified against
    pub block: ScheduleBlock,
}

/// Terminal failure of a check-in attempt.
#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("Student {0} not found")]
    StudentNotFound(StudentId),

    #[error("Class {0} not found")]
    ClassNotFound(ClassId),

    #[error("Student {student_id} is not enrolled in class {class_id}")]
    NotEnrolled {
        student_id: StudentId,
        class_id: ClassId,
    },

    #[error("No class session scheduled for {weekday}")]
    NoSessionToday { weekday: Weekday },

    #[error("Attendance already marked for this class today")]
    AlreadyMarked,

    /// Covers both a negative match and an unreachable face service; the
    /// source distinguishes the two for callers that retry.
    #[error("Face verification failed")]
    FaceVerificationFailed {
        #[source]
        source: Option<FaceVerifyError>,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Classify a check-in instant against a schedule block on a calendar date.
///
/// Boundaries are inclusive-start / exclusive-end:
/// - `now < start + late_allowance` → Present
/// - `start + late_allowance <= now < end` → Late
/// - `now >= end` → Absent
///
/// Total and mutually exclusive for every `(block, now)` pair.
pub fn classify(
    block: &ScheduleBlock,
    clock: &ReferenceClock,
    date: chrono::NaiveDate,
    now: DateTime<Utc>,
) -> AttendanceStatus {
    let start = clock.instant_at(date, block.start_time);
    let end = clock.instant_at(date, block.end_time);
    let late_threshold = start + block.late_allowance();

    if now < late_threshold {
        AttendanceStatus::Present
    } else if now < end {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Absent
    }
}

/// Run one check-in attempt to completion.
///
/// # Arguments
/// * `repo` - Storage backend
/// * `face` - Face-match collaborator, consulted only when a photo is supplied
/// * `clock` - Reference-zone clock
/// * `request` - The attempt
///
/// # Returns
/// * `Ok(CheckInOutcome)` - Stored record plus the resolved block
/// * `Err(CheckInError)` - Terminal failure, see the variants
pub async fn mark_attendance<R: FullRepository + ?Sized>(
    repo: &R,
    face: &dyn FaceVerifier,
    clock: &ReferenceClock,
    request: CheckInRequest,
) -> Result<CheckInOutcome, CheckInError> {
    let student = repo.get_student(request.student_id).await.map_err(|e| {
        if matches!(e, RepositoryError::NotFound { .. }) {
            CheckInError::StudentNotFound(request.student_id)
        } else {
            CheckInError::Repository(e)
        }
    })?;

    let class = repo.get_class(request.class_id).await.map_err(|e| {
        if matches!(e, RepositoryError::NotFound { .. }) {
            CheckInError::ClassNotFound(request.class_id)
        } else {
            CheckInError::Repository(e)
        }
    })?;

    // Step 1: enrollment
    if !repo.is_enrolled(request.student_id, request.class_id).await? {
        return Err(CheckInError::NotEnrolled {
            student_id: request.student_id,
            class_id: request.class_id,
        });
    }

    // Step 2: is today a session day?
    let weekday = clock.weekday(request.now);
    let block = class
        .schedule
        .block_for(weekday)
        .ok_or(CheckInError::NoSessionToday { weekday })?;

    // Step 3: one record per (student, class, local day)
    let local_day = clock.local_date(request.now);
    if repo
        .record_for_day(request.student_id, request.class_id, local_day)
        .await?
        .is_some()
    {
        return Err(CheckInError::AlreadyMarked);
    }

    // Face verification, when a photo came along. Aborts before
    // classification; an upstream failure is never treated as a match.
    if let Some(photo) = &request.photo {
        match face.verify(&student.student_code, photo).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(CheckInError::FaceVerificationFailed { source: None });
            }
            Err(e) => {
                return Err(CheckInError::FaceVerificationFailed { source: Some(e) });
            }
        }
    }

    // Step 4: classification
    let status = classify(block, clock, local_day, request.now);

    // Step 5: persist. A concurrent duplicate loses here and surfaces as
    // AlreadyMarked rather than a generic storage failure.
    let record = AttendanceRecord {
        id: Uuid::new_v4(),
        student_id: request.student_id,
        class_id: request.class_id,
        status,
        timestamp: request.now,
        local_day,
        location: request.location,
        location_status: request.location.map(|_| LocationStatus::Unknown),
        photo_checksum: request.photo.as_deref().map(photo_fingerprint),
    };

    let stored = repo.insert_record(&record).await.map_err(|e| {
        if e.is_conflict() {
            CheckInError::AlreadyMarked
        } else {
            CheckInError::Repository(e)
        }
    })?;

    info!(
        "Marked {} for student {} in class {} on {}",
        stored.status, stored.student_id, stored.class_id, stored.local_day
    );

    Ok(CheckInOutcome {
        record: stored,
        class_name: class.class_name,
        block: block.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WeeklySchedule;
    use chrono::{NaiveDate, NaiveTime};

    fn clock() -> ReferenceClock {
        ReferenceClock::from_name("Asia/Bangkok").unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday_block() -> ScheduleBlock {
        ScheduleBlock::new(vec![Weekday::Mon], time(9, 0), time(10, 0), 15)
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        clock().instant_at(monday(), time(h, m))
    }

    #[test]
    fn test_before_start_is_present() {
        let status = classify(&monday_block(), &clock(), monday(), at(8, 45));
        assert_eq!(status, AttendanceStatus::Present);
    }

    #[test]
    fn test_within_allowance_is_present() {
        let status = classify(&monday_block(), &clock(), monday(), at(9, 10));
        assert_eq!(status, AttendanceStatus::Present);
    }

    #[test]
    fn test_exactly_at_allowance_is_late() {
        // Inclusive-start boundary: 09:15 is the first Late instant
        let status = classify(&monday_block(), &clock(), monday(), at(9, 15));
        assert_eq!(status, AttendanceStatus::Late);
    }

    #[test]
    fn test_after_allowance_is_late() {
        let status = classify(&monday_block(), &clock(), monday(), at(9, 20));
        assert_eq!(status, AttendanceStatus::Late);
    }

    #[test]
    fn test_exactly_at_end_is_absent() {
        let status = classify(&monday_block(), &clock(), monday(), at(10, 0));
        assert_eq!(status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_after_end_is_absent() {
        let status = classify(&monday_block(), &clock(), monday(), at(10, 5));
        assert_eq!(status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_classification_is_total() {
        let block = monday_block();
        for minute in 0..24 * 60 {
            let now = at(minute / 60, minute % 60);
            // Must return exactly one of the three variants without panicking
            let _ = classify(&block, &clock(), monday(), now);
        }
    }

    #[test]
    fn test_zero_allowance_start_is_late() {
        let block = ScheduleBlock::new(vec![Weekday::Mon], time(9, 0), time(10, 0), 0);
        let status = classify(&block, &clock(), monday(), at(9, 0));
        assert_eq!(status, AttendanceStatus::Late);
    }

    #[test]
    fn test_schedule_lookup_used_for_display() {
        let schedule = WeeklySchedule::single(monday_block());
        assert!(schedule.block_for(Weekday::Mon).is_some());
    }
}
