//! Report reconciliation.
//!
//! The expected-session count is always recomputed from the weekly schedule
//! rather than trusted from stored rows, so a session nobody checked in to
//! (and no backfill covered) still counts as absent, while an explicit
//! Absent row is never double-counted.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::info;
use std::collections::HashMap;

use crate::api::{
    AttendanceRecord, AttendanceReport, AttendanceStatus, ClassId, DayAttendanceRow,
    DayAttendanceSummary, LocationStatus, ReferenceClock, StudentId, WeeklySchedule,
};
use crate::db::repository::FullRepository;
use crate::models::occurrence::expected_sessions;
use crate::services::outlier::{consensus_statuses, LocatedSample, OutlierConfig};
use crate::services::{fetch_class, ServiceError};

/// Reconcile recorded attendance against the expected session calendar.
///
/// Pure function of its inputs; calling it twice with identical inputs
/// yields identical output. The returned counts always satisfy
/// `ontime + late + absent == total_expected`, except in the defensive
/// clamp case where historical data drift left more recorded sessions than
/// the schedule implies — then the recorded absent count is used and the
/// invariant is abandoned rather than producing a negative number.
pub fn build_report(
    class_id: ClassId,
    schedule: &WeeklySchedule,
    class_created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    records: &[AttendanceRecord],
    clock: &ReferenceClock,
) -> AttendanceReport {
    let total_expected = expected_sessions(schedule, clock, class_created_at, now);

    let ontime = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    let late = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Late)
        .count();
    let absent_recorded = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Absent)
        .count();

    let attended = ontime + late;
    let absent = if total_expected >= attended {
        total_expected - attended
    } else {
        // Recorded sessions exceed the reconstructed calendar; fall back to
        // what was actually recorded instead of going negative.
        absent_recorded
    };

    AttendanceReport {
        class_id,
        total_expected_sessions: total_expected,
        ontime_count: ontime,
        late_count: late,
        absent_count: absent,
    }
}

/// Attendance report for one student in one class, with the underlying
/// records (newest first) for display.
pub async fn student_report<R: FullRepository + ?Sized>(
    repo: &R,
    clock: &ReferenceClock,
    student_id: StudentId,
    class_id: ClassId,
    now: DateTime<Utc>,
) -> Result<(AttendanceReport, Vec<AttendanceRecord>), ServiceError> {
    let class = fetch_class(repo, class_id).await?;
    crate::services::fetch_student(repo, student_id).await?;

    let records = repo
        .records_for_student_class(student_id, class_id)
        .await?;

    let report = build_report(
        class_id,
        &class.schedule,
        class.created_at,
        now,
        &records,
        clock,
    );

    info!(
        "Report for student {} in class {}: {}/{} on time, {} late, {} absent",
        student_id,
        class_id,
        report.ontime_count,
        report.total_expected_sessions,
        report.late_count,
        report.absent_count
    );

    Ok((report, records))
}

/// Per-date class attendance view.
///
/// Lists every enrolled student; those without a record for the date appear
/// as Absent with no timestamp. Located check-ins are annotated with the
/// pairwise-consensus location verdict (view only, nothing is persisted).
pub async fn class_day_attendance<R: FullRepository + ?Sized>(
    repo: &R,
    class_id: ClassId,
    date: NaiveDate,
    outliers: &OutlierConfig,
) -> Result<(Vec<DayAttendanceRow>, DayAttendanceSummary), ServiceError> {
    let class = fetch_class(repo, class_id).await?;
    if class.schedule.block_for(date.weekday()).is_none() {
        return Err(ServiceError::NoSessionOnDate {
            date,
            weekday: date.weekday(),
        });
    }

    let students = repo.students_for_class(class_id).await?;
    let records = repo.records_for_class_on(class_id, date).await?;

    let by_student: HashMap<StudentId, &AttendanceRecord> =
        records.iter().map(|r| (r.student_id, r)).collect();

    // Pairwise consensus over the day's located check-ins (Strategy A).
    let samples: Vec<LocatedSample> = records
        .iter()
        .filter_map(|r| {
            r.location.map(|point| LocatedSample {
                record_id: r.id,
                student_id: r.student_id,
                point,
            })
        })
        .collect();
    let verdicts = consensus_statuses(&samples, outliers);
    let verdict_by_record: HashMap<_, _> = samples
        .iter()
        .map(|s| s.record_id)
        .zip(verdicts.iter().copied())
        .collect();

    let mut rows = Vec::with_capacity(students.len());
    let mut ontime = 0;
    let mut late = 0;
    let mut location_outliers = 0;

    for student in &students {
        let student_id = match student.id {
            Some(id) => id,
            None => continue,
        };

        let row = match by_student.get(&student_id) {
            Some(record) => {
                match record.status {
                    AttendanceStatus::Present => ontime += 1,
                    AttendanceStatus::Late => late += 1,
                    AttendanceStatus::Absent => {}
                }
                let location_status = verdict_by_record
                    .get(&record.id)
                    .copied()
                    .unwrap_or(LocationStatus::Unknown);
                if location_status == LocationStatus::Outlier {
                    location_outliers += 1;
                }
                DayAttendanceRow {
                    student_id,
                    student_code: student.student_code.clone(),
                    first_name: student.first_name.clone(),
                    last_name: student.last_name.clone(),
                    status: record.status,
                    timestamp: Some(record.timestamp),
                    location_status,
                }
            }
            None => DayAttendanceRow {
                student_id,
                student_code: student.student_code.clone(),
                first_name: student.first_name.clone(),
                last_name: student.last_name.clone(),
                status: AttendanceStatus::Absent,
                timestamp: None,
                location_status: LocationStatus::Unknown,
            },
        };
        rows.push(row);
    }

    let total = rows.len();
    let summary = DayAttendanceSummary {
        total,
        ontime,
        late,
        absent: total - ontime - late,
        location_outliers,
    };

    Ok((rows, summary))
}
