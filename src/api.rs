//! Public API surface for the attendance backend.
//!
//! This file consolidates the domain types shared across the service,
//! repository and HTTP layers. All types derive Serialize/Deserialize for
//! JSON serialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::models::{ReferenceClock, ScheduleBlock, WeeklySchedule};

/// Student identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub i64);

/// Class identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub i64);

impl StudentId {
    pub fn new(value: i64) -> Self {
        StudentId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ClassId {
    pub fn new(value: i64) -> Self {
        ClassId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for StudentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StudentId> for i64 {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

impl From<ClassId> for i64 {
    fn from(id: ClassId) -> Self {
        id.0
    }
}

/// Attendance outcome for a single check-in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Absent => "Absent",
        };
        write!(f, "{}", label)
    }
}

/// Result of the geolocation consistency check for a check-in.
///
/// `Unknown` means no verdict could be reached (no location submitted, or too
/// few simultaneous samples to form a consensus).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationStatus {
    Normal,
    Outlier,
    Unknown,
}

/// Geographic point (latitude, longitude) in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// One attendance record for a (student, class, local calendar day) tuple.
///
/// `local_day` is the calendar date in the deployment's reference time zone;
/// the storage layer enforces uniqueness over (student_id, class_id,
/// local_day). `timestamp` is the absolute check-in instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub status: AttendanceStatus,
    pub timestamp: DateTime<Utc>,
    pub local_day: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_status: Option<LocationStatus>,
    /// SHA-256 fingerprint of the submitted photo payload, kept for audit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_checksum: Option<String>,
}

/// Per-student attendance report for one class, computed on demand.
///
/// Invariant after reconciliation:
/// `ontime_count + late_count + absent_count == total_expected_sessions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceReport {
    pub class_id: ClassId,
    pub total_expected_sessions: usize,
    pub ontime_count: usize,
    pub late_count: usize,
    pub absent_count: usize,
}

/// A class with its recurring weekly schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    /// Database ID (server-assigned, absent on input)
    #[serde(default)]
    pub id: Option<ClassId>,
    pub class_name: String,
    /// Unique short code shown to students
    pub class_code: String,
    pub schedule: WeeklySchedule,
    pub created_at: DateTime<Utc>,
}

/// A student, as far as the attendance engine needs one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(default)]
    pub id: Option<StudentId>,
    /// Unique institutional code (also the face-service identifier)
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
}

/// One row of the per-date class attendance view.
///
/// Enrolled students with no record for the date appear as `Absent` with no
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAttendanceRow {
    pub student_id: StudentId,
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub location_status: LocationStatus,
}

/// Aggregate counters for the per-date class attendance view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAttendanceSummary {
    pub total: usize,
    pub ontime: usize,
    pub late: usize,
    pub absent: usize,
    pub location_outliers: usize,
}

/// Per-sample verdict of the centroid/deviation outlier pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierResult {
    pub student_id: StudentId,
    pub record_id: Uuid,
    /// Haversine distance to the mean center, in meters
    pub distance_m: f64,
    pub is_outlier: bool,
}

/// Outcome of the centroid/deviation outlier pass over one class+date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierAnalysis {
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub mean_center: GeoPoint,
    /// Mean of the per-sample distances to the center, in meters
    pub mean_distance_m: f64,
    /// Distance beyond which a sample is flagged, in meters
    pub outlier_threshold_m: f64,
    pub results: Vec<OutlierResult>,
}
