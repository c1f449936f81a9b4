//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic and
//! isolated execution.
//!
//! The `(student, class, local_day)` uniqueness constraint is enforced by a
//! dedicated slot index checked and updated under the same write lock as the
//! record insert, so concurrent duplicate check-ins resolve to exactly one
//! success and one `Conflict`.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{AttendanceRecord, Class, ClassId, LocationStatus, Student, StudentId};
use crate::db::repository::{
    AttendanceRepository, ErrorContext, RepositoryError, RepositoryResult, RosterRepository,
};

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same underlying data.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    classes: HashMap<ClassId, Class>,
    class_codes: HashMap<String, ClassId>,
    students: HashMap<StudentId, Student>,
    student_codes: HashMap<String, StudentId>,
    // Enrollment pairs in insertion order
    enrollments: Vec<(StudentId, ClassId)>,

    records: HashMap<Uuid, AttendanceRecord>,
    // Uniqueness index over (student, class, local calendar day)
    day_slots: HashMap<(StudentId, ClassId, NaiveDate), Uuid>,

    // ID counters
    next_class_id: i64,
    next_student_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            classes: HashMap::new(),
            class_codes: HashMap::new(),
            students: HashMap::new(),
            student_codes: HashMap::new(),
            enrollments: Vec::new(),
            records: HashMap::new(),
            day_slots: HashMap::new(),
            next_class_id: 1,
            next_student_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
    }

    /// Number of attendance records stored.
    pub fn record_count(&self) -> usize {
        self.data.read().records.len()
    }

    /// Check if a class exists.
    pub fn has_class(&self, class_id: ClassId) -> bool {
        self.data.read().classes.contains_key(&class_id)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn store_class(&self, class: &Class) -> RepositoryResult<ClassId> {
        self.check_health()?;
        let mut data = self.data.write();

        if data.class_codes.contains_key(&class.class_code) {
            return Err(RepositoryError::conflict_with_context(
                format!("Class code '{}' already exists", class.class_code),
                ErrorContext::new("store_class").with_entity("class"),
            ));
        }

        let class_id = ClassId::new(data.next_class_id);
        data.next_class_id += 1;

        let mut stored = class.clone();
        stored.id = Some(class_id);
        data.class_codes.insert(stored.class_code.clone(), class_id);
        data.classes.insert(class_id, stored);

        Ok(class_id)
    }

    async fn get_class(&self, class_id: ClassId) -> RepositoryResult<Class> {
        self.check_health()?;
        let data = self.data.read();
        data.classes.get(&class_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Class {} not found", class_id),
                ErrorContext::new("get_class")
                    .with_entity("class")
                    .with_entity_id(class_id),
            )
        })
    }

    async fn list_classes(&self) -> RepositoryResult<Vec<Class>> {
        self.check_health()?;
        let data = self.data.read();
        let mut classes: Vec<Class> = data.classes.values().cloned().collect();
        classes.sort_by_key(|c| c.id);
        Ok(classes)
    }

    async fn store_student(&self, student: &Student) -> RepositoryResult<StudentId> {
        self.check_health()?;
        let mut data = self.data.write();

        if data.student_codes.contains_key(&student.student_code) {
            return Err(RepositoryError::conflict_with_context(
                format!("Student code '{}' already exists", student.student_code),
                ErrorContext::new("store_student").with_entity("student"),
            ));
        }

        let student_id = StudentId::new(data.next_student_id);
        data.next_student_id += 1;

        let mut stored = student.clone();
        stored.id = Some(student_id);
        data.student_codes
            .insert(stored.student_code.clone(), student_id);
        data.students.insert(student_id, stored);

        Ok(student_id)
    }

    async fn get_student(&self, student_id: StudentId) -> RepositoryResult<Student> {
        self.check_health()?;
        let data = self.data.read();
        data.students.get(&student_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Student {} not found", student_id),
                ErrorContext::new("get_student")
                    .with_entity("student")
                    .with_entity_id(student_id),
            )
        })
    }

    async fn enroll(&self, student_id: StudentId, class_id: ClassId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();

        if !data.students.contains_key(&student_id) {
            return Err(RepositoryError::not_found(format!(
                "Student {} not found",
                student_id
            )));
        }
        if !data.classes.contains_key(&class_id) {
            return Err(RepositoryError::not_found(format!(
                "Class {} not found",
                class_id
            )));
        }

        let pair = (student_id, class_id);
        if !data.enrollments.contains(&pair) {
            data.enrollments.push(pair);
        }
        Ok(())
    }

    async fn is_enrolled(
        &self,
        student_id: StudentId,
        class_id: ClassId,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data.enrollments.contains(&(student_id, class_id)))
    }

    async fn students_for_class(&self, class_id: ClassId) -> RepositoryResult<Vec<Student>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .enrollments
            .iter()
            .filter(|(_, cid)| *cid == class_id)
            .filter_map(|(sid, _)| data.students.get(sid).cloned())
            .collect())
    }
}

#[async_trait]
impl AttendanceRepository for LocalRepository {
    async fn insert_record(
        &self,
        record: &AttendanceRecord,
    ) -> RepositoryResult<AttendanceRecord> {
        self.check_health()?;
        let mut data = self.data.write();

        if !data.students.contains_key(&record.student_id) {
            return Err(RepositoryError::not_found(format!(
                "Student {} not found",
                record.student_id
            )));
        }
        if !data.classes.contains_key(&record.class_id) {
            return Err(RepositoryError::not_found(format!(
                "Class {} not found",
                record.class_id
            )));
        }

        let slot = (record.student_id, record.class_id, record.local_day);
        if data.day_slots.contains_key(&slot) {
            return Err(RepositoryError::conflict_with_context(
                "Attendance already recorded for this class and day".to_string(),
                ErrorContext::new("insert_record")
                    .with_entity("record")
                    .with_details(format!(
                        "student={} class={} day={}",
                        record.student_id, record.class_id, record.local_day
                    )),
            ));
        }

        data.day_slots.insert(slot, record.id);
        data.records.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn record_for_day(
        &self,
        student_id: StudentId,
        class_id: ClassId,
        day: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .day_slots
            .get(&(student_id, class_id, day))
            .and_then(|id| data.records.get(id))
            .cloned())
    }

    async fn records_for_student_class(
        &self,
        student_id: StudentId,
        class_id: ClassId,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        self.check_health()?;
        let data = self.data.read();
        let mut records: Vec<AttendanceRecord> = data
            .records
            .values()
            .filter(|r| r.student_id == student_id && r.class_id == class_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    async fn records_for_class_on(
        &self,
        class_id: ClassId,
        day: NaiveDate,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        self.check_health()?;
        let data = self.data.read();
        let mut records: Vec<AttendanceRecord> = data
            .records
            .values()
            .filter(|r| r.class_id == class_id && r.local_day == day)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(records)
    }

    async fn update_location_status(
        &self,
        record_id: Uuid,
        status: LocationStatus,
    ) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        let record = data.records.get_mut(&record_id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Record {} not found", record_id),
                ErrorContext::new("update_location_status").with_entity("record"),
            )
        })?;
        record.location_status = Some(status);
        Ok(())
    }
}
