use axum::async_trait;
use uuid::Uuid;

use super::repo_types::{Invitation, InvitationStatus, InvitationWithEvent, InvitationWithInvitee};
use crate::{error::AppResult, store::PgStore};

#[async_trait]
pub trait InvitationRepo: Send + Sync {
    /// Creates a `pending` invitation. A second invitation for the same
    /// (event, invitee) pair fails with `Conflict`.
    async fn create_invitation(
        &self,
        event_id: Uuid,
        invitee_id: Uuid,
        role: &str,
    ) -> AppResult<Invitation>;
    async fn find_invitation(&self, id: Uuid) -> AppResult<Option<Invitation>>;
    async fn find_invitation_for(
        &self,
        event_id: Uuid,
        invitee_id: Uuid,
    ) -> AppResult<Option<Invitation>>;
    /// Moves a still-pending invitation to `status`; `None` if it is no longer pending.
    async fn respond_invitation(
        &self,
        id: Uuid,
        status: InvitationStatus,
    ) -> AppResult<Option<Invitation>>;
    /// Deletes the invitation and the invitee's attendance for that event.
    async fn revoke_invitation(&self, id: Uuid) -> AppResult<Option<Invitation>>;
    async fn list_invitations_for_event(
        &self,
        event_id: Uuid,
    ) -> AppResult<Vec<InvitationWithInvitee>>;
    async fn list_invitations_for_user(
        &self,
        invitee_id: Uuid,
    ) -> AppResult<Vec<InvitationWithEvent>>;
}

#[async_trait]
impl InvitationRepo for PgStore {
    async fn create_invitation(
        &self,
        event_id: Uuid,
        invitee_id: Uuid,
        role: &str,
    ) -> AppResult<Invitation> {
        let row = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO event_invitations (event_id, invitee_id, role, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING id, event_id, invitee_id, role, status, created_at, responded_at
            "#,
        )
        .bind(event_id)
        .bind(invitee_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_invitation(&self, id: Uuid) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, event_id, invitee_id, role, status, created_at, responded_at
            FROM event_invitations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_invitation_for(
        &self,
        event_id: Uuid,
        invitee_id: Uuid,
    ) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, event_id, invitee_id, role, status, created_at, responded_at
            FROM event_invitations
            WHERE event_id = $1 AND invitee_id = $2
            "#,
        )
        .bind(event_id)
        .bind(invitee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn respond_invitation(
        &self,
        id: Uuid,
        status: InvitationStatus,
    ) -> AppResult<Option<Invitation>> {
        let row = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE event_invitations
               SET status = $2, responded_at = now()
             WHERE id = $1 AND status = 'pending'
            RETURNING id, event_id, invitee_id, role, status, created_at, responded_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn revoke_invitation(&self, id: Uuid) -> AppResult<Option<Invitation>> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query_as::<_, Invitation>(
            r#"
            DELETE FROM event_invitations
             WHERE id = $1
            RETURNING id, event_id, invitee_id, role, status, created_at, responded_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(inv) = &removed {
            sqlx::query("DELETE FROM event_attendance WHERE event_id = $1 AND user_id = $2")
                .bind(inv.event_id)
                .bind(inv.invitee_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(removed)
    }

    async fn list_invitations_for_event(
        &self,
        event_id: Uuid,
    ) -> AppResult<Vec<InvitationWithInvitee>> {
        let rows = sqlx::query_as::<_, InvitationWithInvitee>(
            r#"
            SELECT ei.id, ei.event_id, ei.invitee_id, ei.role, ei.status,
                   ei.created_at, ei.responded_at,
                   u.email AS invitee_email
              FROM event_invitations ei
              JOIN users u ON u.id = ei.invitee_id
             WHERE ei.event_id = $1
             ORDER BY ei.created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_invitations_for_user(
        &self,
        invitee_id: Uuid,
    ) -> AppResult<Vec<InvitationWithEvent>> {
        let rows = sqlx::query_as::<_, InvitationWithEvent>(
            r#"
            SELECT ei.id, ei.event_id, ei.invitee_id, ei.role, ei.status,
                   ei.created_at, ei.responded_at,
                   e.title AS event_title,
                   e.description AS event_description,
                   e.event_date,
                   e.event_time,
                   e.location AS event_location,
                   e.organizer_id,
                   u.email AS organizer_email
              FROM event_invitations ei
              JOIN events e ON e.id = ei.event_id
              JOIN users u ON u.id = e.organizer_id
             WHERE ei.invitee_id = $1
             ORDER BY e.event_date DESC, e.event_time DESC, ei.created_at DESC
            "#,
        )
        .bind(invitee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
