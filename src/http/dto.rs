//! Request/response DTOs for the REST API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{
    AttendanceRecord, AttendanceReport, DayAttendanceRow, DayAttendanceSummary, GeoPoint,
    ScheduleBlock,
};

/// POST /v1/attendance request body.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendanceRequest {
    pub student_id: i64,
    pub class_id: i64,
    /// Check-in instant; defaults to the server's current time
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Base64 photo payload for face verification
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Class display details echoed back with a successful check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDisplay {
    pub class_name: String,
    pub start_time: String,
    pub end_time: String,
    pub late_allowance_minutes: i64,
}

impl ClassDisplay {
    pub fn from_block(class_name: String, block: &ScheduleBlock) -> Self {
        Self {
            class_name,
            start_time: block.start_time.format("%H:%M").to_string(),
            end_time: block.end_time.format("%H:%M").to_string(),
            late_allowance_minutes: block.late_allowance_minutes,
        }
    }
}

/// POST /v1/attendance response body.
#[derive(Debug, Clone, Serialize)]
pub struct MarkAttendanceResponse {
    pub message: String,
    pub attendance: AttendanceRecord,
    pub class_details: ClassDisplay,
}

/// GET report response body.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub student_id: i64,
    pub report: AttendanceReport,
    /// Underlying records, newest first
    pub records: Vec<AttendanceRecord>,
}

/// GET per-date class attendance response body.
#[derive(Debug, Clone, Serialize)]
pub struct DayAttendanceResponse {
    pub class_name: String,
    pub class_code: String,
    pub date: NaiveDate,
    pub attendance: Vec<DayAttendanceRow>,
    pub summary: DayAttendanceSummary,
}

/// POST backfill response body.
#[derive(Debug, Clone, Serialize)]
pub struct BackfillResponse {
    pub message: String,
    pub absent_count: usize,
}

/// GET /health response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
