//! Service layer for business logic and orchestration.
//!
//! This module contains the service layer that sits between the repository
//! traits and the HTTP surface. Services orchestrate storage calls and
//! implement the attendance engine: check-in classification, report
//! reconciliation, location-outlier detection and absence backfill. All
//! services are pure computations over supplied data plus explicit storage
//! side effects; none of them reads ambient time or a machine-local zone.

pub mod backfill;
pub mod checkin;
pub mod face;
pub mod outlier;
pub mod report;

pub use backfill::{backfill_class_date, sweep_absences};
pub use checkin::{classify, mark_attendance, CheckInError, CheckInOutcome, CheckInRequest};
pub use face::{AcceptAll, FaceVerifier, FaceVerifyError, FixedVerdict};
pub use outlier::{
    detect_class_outliers, haversine_distance_m, OutlierConfig,
};
pub use report::{build_report, class_day_attendance, student_report};

use chrono::{NaiveDate, Weekday};

use crate::api::{Class, ClassId, Student, StudentId};
use crate::db::repository::{FullRepository, RepositoryError};

/// Error taxonomy shared by the report, outlier and backfill services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Class {0} not found")]
    ClassNotFound(ClassId),

    #[error("Student {0} not found")]
    StudentNotFound(StudentId),

    #[error("No class session scheduled on {date} ({weekday})")]
    NoSessionOnDate { date: NaiveDate, weekday: Weekday },

    #[error("Class session on {date} has not finished yet")]
    SessionNotFinished { date: NaiveDate },

    /// Too few located samples for outlier detection. Not an exceptional
    /// condition; surfaced so callers can render a declined result.
    #[error("Not enough located check-ins for outlier detection (found {found}, need {required})")]
    InsufficientData { found: usize, required: usize },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Fetch a class, turning the repository's NotFound into the service-level
/// variant so HTTP can name the missing entity.
pub(crate) async fn fetch_class<R: FullRepository + ?Sized>(
    repo: &R,
    class_id: ClassId,
) -> Result<Class, ServiceError> {
    repo.get_class(class_id).await.map_err(|e| match e {
        RepositoryError::NotFound { .. } => ServiceError::ClassNotFound(class_id),
        other => ServiceError::Repository(other),
    })
}

/// Fetch a student; see [`fetch_class`].
pub(crate) async fn fetch_student<R: FullRepository + ?Sized>(
    repo: &R,
    student_id: StudentId,
) -> Result<Student, ServiceError> {
    repo.get_student(student_id).await.map_err(|e| match e {
        RepositoryError::NotFound { .. } => ServiceError::StudentNotFound(student_id),
        other => ServiceError::Repository(other),
    })
}
