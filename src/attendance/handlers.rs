use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{AttendanceListResponse, AttendanceResponse, MarkAttendanceRequest},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{Json, Path},
    state::AppState,
};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/attendance", post(mark_attendance))
        .route(
            "/attendance/event/:event_id",
            get(list_attendance).delete(unmark_attendance),
        )
}

#[instrument(skip(state))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<MarkAttendanceRequest>,
) -> AppResult<(StatusCode, Json<AttendanceResponse>)> {
    let attendance = services::mark(state.store.as_ref(), user_id, body.event_id).await?;
    Ok((StatusCode::CREATED, Json(AttendanceResponse { attendance })))
}

#[instrument(skip(state))]
pub async fn list_attendance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<AttendanceListResponse>> {
    let attendance = services::list_for_event(state.store.as_ref(), user_id, event_id).await?;
    Ok(Json(AttendanceListResponse { attendance }))
}

#[instrument(skip(state))]
pub async fn unmark_attendance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::unmark(state.store.as_ref(), user_id, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
