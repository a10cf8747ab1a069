use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dates,
    dto::{AttendanceRequest, AttendanceSaved},
    repo_types::{
        AttendanceByStudent, AttendanceBySubject, Group, NewAttendance, ScheduleEntry, Student,
    },
};
use crate::{
    auth::handlers::bad_body,
    db::StoreError,
    error::{AppError, AppResult},
    response::ApiSuccess,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students))
        .route("/students/:id", get(get_student))
        .route("/groups", get(list_groups))
        .route("/groups/:id", get(get_group))
        .route("/schedule", get(list_schedule))
        .route("/schedule/group/:id", get(group_schedule))
        .route("/attendanceBySubjectId/:id", get(attendance_by_subject))
        .route("/attendanceByStudentId/:id", get(attendance_by_student))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/attendance/subject", post(create_attendance))
}

/// Path ids must be positive integers.
fn parse_id(raw: &str, what: &str) -> AppResult<i32> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            warn!(id = %raw, what, "invalid id");
            Err(AppError::validation(format!("Invalid {what} ID")))
        }
    }
}

/// `data: []` plus an explanatory message when nothing matched.
fn list_response<T: serde::Serialize>(items: Vec<T>, empty_message: &str) -> ApiSuccess<Vec<T>> {
    if items.is_empty() {
        ApiSuccess::ok(items).with_message(empty_message)
    } else {
        ApiSuccess::ok(items)
    }
}

#[instrument(skip(state))]
pub async fn list_students(State(state): State<AppState>) -> AppResult<ApiSuccess<Vec<Student>>> {
    let students = state
        .university
        .list_students()
        .await
        .map_err(|e| AppError::internal("Failed to load students", e))?;
    info!(count = students.len(), "students loaded");
    Ok(list_response(students, "No students found"))
}

#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiSuccess<Student>> {
    let id = parse_id(&id, "student")?;
    let student = state
        .university
        .get_student(id)
        .await
        .map_err(|e| AppError::internal("Internal server error", e))?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;
    Ok(ApiSuccess::ok(student))
}

#[instrument(skip(state))]
pub async fn list_groups(State(state): State<AppState>) -> AppResult<ApiSuccess<Vec<Group>>> {
    let groups = state
        .university
        .list_groups()
        .await
        .map_err(|e| AppError::internal("Failed to load groups", e))?;
    info!(count = groups.len(), "groups loaded");
    Ok(list_response(groups, "No groups found"))
}

#[instrument(skip(state))]
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiSuccess<Group>> {
    let id = parse_id(&id, "group")?;
    let group = state
        .university
        .get_group(id)
        .await
        .map_err(|e| AppError::internal("Internal server error", e))?
        .ok_or_else(|| AppError::NotFound("Group not found".into()))?;
    Ok(ApiSuccess::ok(group))
}

#[instrument(skip(state))]
pub async fn list_schedule(
    State(state): State<AppState>,
) -> AppResult<ApiSuccess<Vec<ScheduleEntry>>> {
    let schedule = state
        .university
        .list_schedule()
        .await
        .map_err(|e| AppError::internal("Failed to load schedule", e))?;
    info!(count = schedule.len(), "schedule loaded");
    Ok(list_response(schedule, "Schedule is empty"))
}

#[instrument(skip(state))]
pub async fn group_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiSuccess<Vec<ScheduleEntry>>> {
    let group_id = parse_id(&id, "group")?;
    let schedule = state
        .university
        .group_schedule(group_id)
        .await
        .map_err(|e| AppError::internal("Failed to load schedule", e))?;
    info!(group_id, count = schedule.len(), "group schedule loaded");
    Ok(list_response(schedule, "Schedule for this group is empty"))
}

#[instrument(skip(state, payload))]
pub async fn create_attendance(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> AppResult<ApiSuccess<AttendanceSaved>> {
    let Json(req) = payload.map_err(bad_body)?;

    if req.schedule_id <= 0 {
        return Err(AppError::validation("schedule_id is required"));
    }
    if req.visit_day.trim().is_empty() {
        return Err(AppError::validation("visit_day is required"));
    }
    if req.student_id <= 0 {
        return Err(AppError::validation("student_id is required"));
    }

    let visit_day = dates::normalize(&req.visit_day).map_err(|e| {
        warn!(date = %req.visit_day, error = %e, "unsupported visit day");
        AppError::from(e)
    })?;

    let record = NewAttendance {
        student_id: req.student_id,
        schedule_id: req.schedule_id,
        visit_day,
        visited: req.visited,
    };
    info!(
        schedule_id = record.schedule_id,
        student_id = record.student_id,
        visit_day = %record.visit_day,
        visited = record.visited,
        "saving attendance"
    );

    state
        .university
        .upsert_attendance(&record)
        .await
        .map_err(|e| match e {
            StoreError::Database(e) => {
                AppError::internal("Failed to save attendance record", e)
            }
            other => AppError::from(other),
        })?;

    Ok(ApiSuccess::created(AttendanceSaved {
        student_id: record.student_id,
        schedule_id: record.schedule_id,
        visit_day: record.visit_day,
        visited: record.visited,
    })
    .with_message("Attendance record saved"))
}

#[instrument(skip(state))]
pub async fn attendance_by_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiSuccess<Vec<AttendanceBySubject>>> {
    let schedule_id = parse_id(&id, "subject")?;
    let rows = state
        .university
        .attendance_by_subject(schedule_id)
        .await
        .map_err(|e| AppError::internal("Failed to load attendance", e))?;
    info!(schedule_id, count = rows.len(), "attendance by subject loaded");
    Ok(list_response(rows, "No attendance recorded for this subject"))
}

#[instrument(skip(state))]
pub async fn attendance_by_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiSuccess<Vec<AttendanceByStudent>>> {
    let student_id = parse_id(&id, "student")?;
    let rows = state
        .university
        .attendance_by_student(student_id)
        .await
        .map_err(|e| AppError::internal("Failed to load attendance", e))?;
    info!(student_id, count = rows.len(), "attendance by student loaded");
    Ok(list_response(rows, "No attendance recorded for this student"))
}
