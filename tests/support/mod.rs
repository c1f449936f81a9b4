#![allow(dead_code)]

//! Shared fixtures for the integration suites.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};

use ats_rust::api::{Class, ClassId, Student, StudentId};
use ats_rust::db::repository::RosterRepository;
use ats_rust::db::LocalRepository;
use ats_rust::models::{ReferenceClock, ScheduleBlock, WeeklySchedule};

pub fn clock() -> ReferenceClock {
    ReferenceClock::from_name("Asia/Bangkok").unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bangkok wall time expressed as a UTC instant.
pub fn wall(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    clock().instant_at(date(y, mo, d), time(h, mi))
}

/// Monday 09:00-10:00 with a 15 minute late allowance.
pub fn monday_schedule() -> WeeklySchedule {
    WeeklySchedule::single(ScheduleBlock::new(
        vec![Weekday::Mon],
        time(9, 0),
        time(10, 0),
        15,
    ))
}

pub async fn seed_class(
    repo: &LocalRepository,
    code: &str,
    schedule: WeeklySchedule,
    created_at: DateTime<Utc>,
) -> ClassId {
    repo.store_class(&Class {
        id: None,
        class_name: format!("Class {}", code),
        class_code: code.to_string(),
        schedule,
        created_at,
    })
    .await
    .unwrap()
}

pub async fn seed_student(repo: &LocalRepository, code: &str) -> StudentId {
    repo.store_student(&Student {
        id: None,
        student_code: code.to_string(),
        first_name: "Test".to_string(),
        last_name: code.to_string(),
    })
    .await
    .unwrap()
}

/// Seed a Monday class created three weeks before `wall(2025, 3, 24, ..)`
/// with `n` enrolled students.
pub async fn seed_enrolled_class(
    repo: &LocalRepository,
    n: usize,
) -> (ClassId, Vec<StudentId>) {
    let class_id = seed_class(
        repo,
        "LA101",
        monday_schedule(),
        wall(2025, 3, 3, 8, 0),
    )
    .await;

    let mut students = Vec::with_capacity(n);
    for i in 0..n {
        let student_id = seed_student(repo, &format!("S-{}", i + 1)).await;
        repo.enroll(student_id, class_id).await.unwrap();
        students.push(student_id);
    }

    (class_id, students)
}
