//! Roster repository trait: classes, students and enrollment membership.
//!
//! The attendance engine treats the roster as an external collaborator; this
//! trait is the narrow interface it consumes. There is deliberately no
//! update/delete surface here — catalog management is out of scope.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Class, ClassId, Student, StudentId};

/// Repository trait for roster lookups and seeding.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait RosterRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the backing store is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is reachable
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Class Operations ====================

    /// Store a new class and assign it an ID.
    ///
    /// # Returns
    /// * `Ok(ClassId)` - ID assigned to the class
    /// * `Err(RepositoryError::Conflict)` - If the class code is already taken
    async fn store_class(&self, class: &Class) -> RepositoryResult<ClassId>;

    /// Retrieve a class by ID.
    ///
    /// # Returns
    /// * `Ok(Class)` - The class with its full weekly schedule
    /// * `Err(RepositoryError::NotFound)` - If the class doesn't exist
    async fn get_class(&self, class_id: ClassId) -> RepositoryResult<Class>;

    /// List all classes.
    async fn list_classes(&self) -> RepositoryResult<Vec<Class>>;

    // ==================== Student Operations ====================

    /// Store a new student and assign them an ID.
    ///
    /// # Returns
    /// * `Ok(StudentId)` - ID assigned to the student
    /// * `Err(RepositoryError::Conflict)` - If the student code is already taken
    async fn store_student(&self, student: &Student) -> RepositoryResult<StudentId>;

    /// Retrieve a student by ID.
    ///
    /// # Returns
    /// * `Ok(Student)` - The student record
    /// * `Err(RepositoryError::NotFound)` - If the student doesn't exist
    async fn get_student(&self, student_id: StudentId) -> RepositoryResult<Student>;

    // ==================== Enrollment ====================

    /// Link a student to a class.
    ///
    /// Idempotent; enrolling an already-enrolled student is a no-op.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If student or class doesn't exist
    async fn enroll(&self, student_id: StudentId, class_id: ClassId) -> RepositoryResult<()>;

    /// Whether the student is enrolled in the class.
    async fn is_enrolled(
        &self,
        student_id: StudentId,
        class_id: ClassId,
    ) -> RepositoryResult<bool>;

    /// All students enrolled in a class, in enrollment order.
    async fn students_for_class(&self, class_id: ClassId) -> RepositoryResult<Vec<Student>>;
}
