use axum::async_trait;
use uuid::Uuid;

use super::repo_types::{Attendance, AttendanceWithUser};
use crate::{error::AppResult, store::PgStore};

#[async_trait]
pub trait AttendanceRepo: Send + Sync {
    /// Records the user as present if, at the moment of writing, they organize
    /// the event or hold an accepted invitation. Returns `None` otherwise.
    /// Marking twice returns the original record.
    async fn mark_attendance(&self, event_id: Uuid, user_id: Uuid)
        -> AppResult<Option<Attendance>>;
    async fn list_attendance(&self, event_id: Uuid) -> AppResult<Vec<AttendanceWithUser>>;
    async fn unmark_attendance(&self, event_id: Uuid, user_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
impl AttendanceRepo for PgStore {
    async fn mark_attendance(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Attendance>> {
        // FOR SHARE makes the eligibility check wait for an in-flight revoke or
        // delete of the rows it reads; once that commits the row is gone and
        // nothing is inserted.
        let row = sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO event_attendance (event_id, user_id)
            SELECT $1, $2
             WHERE EXISTS (SELECT 1 FROM events
                            WHERE id = $1 AND organizer_id = $2
                              FOR SHARE)
                OR EXISTS (SELECT 1 FROM event_invitations
                            WHERE event_id = $1 AND invitee_id = $2 AND status = 'accepted'
                              FOR SHARE)
            ON CONFLICT (event_id, user_id)
                DO UPDATE SET marked_at = event_attendance.marked_at
            RETURNING id, event_id, user_id, marked_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_attendance(&self, event_id: Uuid) -> AppResult<Vec<AttendanceWithUser>> {
        let rows = sqlx::query_as::<_, AttendanceWithUser>(
            r#"
            SELECT a.id, a.event_id, a.user_id, a.marked_at,
                   u.email AS user_email
              FROM event_attendance a
              JOIN users u ON u.id = a.user_id
             WHERE a.event_id = $1
             ORDER BY a.marked_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn unmark_attendance(&self, event_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM event_attendance WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
