use tracing::info;
use uuid::Uuid;

use super::{
    repo::AttendanceRepo,
    repo_types::{Attendance, AttendanceWithUser},
};
use crate::{
    access::{authorize, Action},
    error::{AppError, AppResult},
    store::Store,
};

/// Marks the caller present. Allowed for the organizer and accepted invitees.
pub async fn mark(store: &dyn Store, user_id: Uuid, event_id: Uuid) -> AppResult<Attendance> {
    authorize(store, user_id, event_id, Action::MarkAttendance).await?;
    // The write re-checks eligibility atomically; losing it in between means
    // the invitation was revoked or the event deleted.
    let attendance = store
        .mark_attendance(event_id, user_id)
        .await?
        .ok_or(AppError::Forbidden)?;
    info!(%event_id, %user_id, "attendance marked");
    Ok(attendance)
}

pub async fn list_for_event(
    store: &dyn Store,
    user_id: Uuid,
    event_id: Uuid,
) -> AppResult<Vec<AttendanceWithUser>> {
    authorize(store, user_id, event_id, Action::View).await?;
    store.list_attendance(event_id).await
}

pub async fn unmark(store: &dyn Store, user_id: Uuid, event_id: Uuid) -> AppResult<()> {
    authorize(store, user_id, event_id, Action::MarkAttendance).await?;
    if !store.unmark_attendance(event_id, user_id).await? {
        return Err(AppError::NotFound("attendance"));
    }
    info!(%event_id, %user_id, "attendance removed");
    Ok(())
}
