//! Attendance repository trait.
//!
//! Storage contract for attendance records. The one invariant the store must
//! uphold is uniqueness over `(student_id, class_id, local_day)`: a second
//! insert into an occupied slot fails with `RepositoryError::Conflict`, which
//! is how concurrent duplicate check-ins (and backfill races) are resolved.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::error::RepositoryResult;
use crate::api::{AttendanceRecord, ClassId, LocationStatus, StudentId};

/// Repository trait for attendance record storage and queries.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert a new attendance record.
    ///
    /// The check-then-insert sequence callers perform is not atomic on its
    /// own; this method re-checks the `(student, class, local_day)` slot
    /// under the store's own synchronization and fails with `Conflict` if it
    /// is occupied. Callers decide whether a conflict is an error (live
    /// check-in: AlreadyMarked) or expected (backfill: lost the race, skip).
    ///
    /// # Arguments
    /// * `record` - Record to insert, including its precomputed `local_day`
    ///
    /// # Returns
    /// * `Ok(AttendanceRecord)` - The stored record
    /// * `Err(RepositoryError::Conflict)` - If the day slot is occupied
    /// * `Err(RepositoryError::NotFound)` - If student or class doesn't exist
    async fn insert_record(
        &self,
        record: &AttendanceRecord,
    ) -> RepositoryResult<AttendanceRecord>;

    /// Record for a (student, class, local calendar day) slot, if any.
    async fn record_for_day(
        &self,
        student_id: StudentId,
        class_id: ClassId,
        day: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>>;

    /// All records for a student in a class, newest first.
    async fn records_for_student_class(
        &self,
        student_id: StudentId,
        class_id: ClassId,
    ) -> RepositoryResult<Vec<AttendanceRecord>>;

    /// All records for a class on one local calendar day.
    async fn records_for_class_on(
        &self,
        class_id: ClassId,
        day: NaiveDate,
    ) -> RepositoryResult<Vec<AttendanceRecord>>;

    /// Overwrite the location status of a record.
    ///
    /// Idempotent; used by the outlier detection pass.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the record doesn't exist
    async fn update_location_status(
        &self,
        record_id: Uuid,
        status: LocationStatus,
    ) -> RepositoryResult<()>;
}
