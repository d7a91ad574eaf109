use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Attendance, AttendanceWithUser};

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub event_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub attendance: Attendance,
}

#[derive(Debug, Serialize)]
pub struct AttendanceListResponse {
    pub attendance: Vec<AttendanceWithUser>,
}
