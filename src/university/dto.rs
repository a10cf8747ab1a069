use serde::{Deserialize, Serialize};

/// Body of `POST /attendance/subject`. Missing fields default to zero/empty
/// so the handler can name exactly which one is absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AttendanceRequest {
    pub schedule_id: i32,
    pub visit_day: String,
    pub visited: bool,
    pub student_id: i32,
}

#[derive(Debug, Serialize)]
pub struct AttendanceSaved {
    pub student_id: i32,
    pub schedule_id: i32,
    pub visit_day: String,
    pub visited: bool,
}
