//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer for business logic.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};

use super::dto::{
    BackfillResponse, ClassDisplay, DayAttendanceResponse, HealthResponse, MarkAttendanceRequest,
    MarkAttendanceResponse, ReportResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{ClassId, OutlierAnalysis, StudentId};
use crate::db::repository::RosterRepository;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the backing
/// store is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Check-in
// =============================================================================

/// POST /v1/attendance
///
/// Mark attendance for a student in a class. The check-in instant defaults
/// to the server's current time; clients may supply one explicitly.
pub async fn mark_attendance(
    State(state): State<AppState>,
    Json(request): Json<MarkAttendanceRequest>,
) -> Result<(StatusCode, Json<MarkAttendanceResponse>), AppError> {
    let now = request.timestamp.unwrap_or_else(Utc::now);

    let outcome = services::mark_attendance(
        state.repository.as_ref(),
        state.face.as_ref(),
        &state.clock,
        services::CheckInRequest {
            student_id: StudentId::new(request.student_id),
            class_id: ClassId::new(request.class_id),
            now,
            photo: request.photo,
            location: request.location,
        },
    )
    .await?;

    let response = MarkAttendanceResponse {
        message: "Attendance marked successfully".to_string(),
        class_details: ClassDisplay::from_block(outcome.class_name.clone(), &outcome.block),
        attendance: outcome.record,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

// =============================================================================
// Reports
// =============================================================================

/// GET /v1/students/{student_id}/classes/{class_id}/report
///
/// Attendance report for one student in one class, reconciled against the
/// expected session calendar up to now.
pub async fn get_report(
    State(state): State<AppState>,
    Path((student_id, class_id)): Path<(i64, i64)>,
) -> HandlerResult<ReportResponse> {
    let (report, records) = services::student_report(
        state.repository.as_ref(),
        &state.clock,
        StudentId::new(student_id),
        ClassId::new(class_id),
        Utc::now(),
    )
    .await?;

    Ok(Json(ReportResponse {
        student_id,
        report,
        records,
    }))
}

/// GET /v1/classes/{class_id}/attendance/{date}
///
/// Per-student attendance for a class on one date, including enrolled
/// students with no record, plus summary counters.
pub async fn get_class_attendance(
    State(state): State<AppState>,
    Path((class_id, date)): Path<(i64, NaiveDate)>,
) -> HandlerResult<DayAttendanceResponse> {
    let class_id = ClassId::new(class_id);
    let class = state.repository.get_class(class_id).await?;

    let (attendance, summary) = services::class_day_attendance(
        state.repository.as_ref(),
        class_id,
        date,
        &state.outliers,
    )
    .await?;

    Ok(Json(DayAttendanceResponse {
        class_name: class.class_name,
        class_code: class.class_code,
        date,
        attendance,
        summary,
    }))
}

// =============================================================================
// Location Outliers
// =============================================================================

/// POST /v1/classes/{class_id}/attendance/{date}/outliers
///
/// Run the centroid/deviation outlier pass over the located check-ins of a
/// class+date and persist the verdicts.
pub async fn detect_outliers(
    State(state): State<AppState>,
    Path((class_id, date)): Path<(i64, NaiveDate)>,
) -> HandlerResult<OutlierAnalysis> {
    let analysis = services::detect_class_outliers(
        state.repository.as_ref(),
        ClassId::new(class_id),
        date,
        &state.outliers,
    )
    .await?;

    Ok(Json(analysis))
}

// =============================================================================
// Absence Backfill
// =============================================================================

/// POST /v1/classes/{class_id}/attendance/{date}/backfill
///
/// Insert Absent records for enrolled students without a record on the
/// given (finished) session date.
pub async fn backfill_absences(
    State(state): State<AppState>,
    Path((class_id, date)): Path<(i64, NaiveDate)>,
) -> HandlerResult<BackfillResponse> {
    let count = services::backfill_class_date(
        state.repository.as_ref(),
        &state.clock,
        ClassId::new(class_id),
        date,
        Utc::now(),
    )
    .await?;

    Ok(Json(BackfillResponse {
        message: "Absent records created successfully".to_string(),
        absent_count: count,
    }))
}
