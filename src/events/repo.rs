use axum::async_trait;
use uuid::Uuid;

use super::repo_types::{Event, EventListing, EventSearch, NewEvent};
use crate::{auth::repo::escape_like, error::AppResult, store::PgStore};

#[async_trait]
pub trait EventRepo: Send + Sync {
    /// Fails with `NotFound` when the organizer does not exist.
    async fn create_event(&self, organizer_id: Uuid, event: &NewEvent) -> AppResult<Event>;
    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>>;
    async fn update_event(&self, id: Uuid, event: &NewEvent) -> AppResult<Option<Event>>;
    /// Removes the event together with its invitations and attendance.
    async fn delete_event(&self, id: Uuid) -> AppResult<bool>;
    async fn find_by_organizer(&self, user_id: Uuid) -> AppResult<Vec<EventListing>>;
    async fn find_invited(&self, user_id: Uuid) -> AppResult<Vec<EventListing>>;
    /// Searches events the user organizes or is invited to.
    async fn search_events(&self, user_id: Uuid, filter: &EventSearch)
        -> AppResult<Vec<EventListing>>;
}

#[async_trait]
impl EventRepo for PgStore {
    async fn create_event(&self, organizer_id: Uuid, event: &NewEvent) -> AppResult<Event> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, event_date, event_time, location, organizer_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, event_date, event_time, location,
                      organizer_id, created_at, updated_at
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(&event.location)
        .bind(organizer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, event_date, event_time, location,
                   organizer_id, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_event(&self, id: Uuid, event: &NewEvent) -> AppResult<Option<Event>> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
               SET title = $2, description = $3, event_date = $4, event_time = $5,
                   location = $6, updated_at = now()
             WHERE id = $1
            RETURNING id, title, description, event_date, event_time, location,
                      organizer_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.event_date)
        .bind(event.event_time)
        .bind(&event.location)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        // event_invitations and event_attendance go with it via ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_by_organizer(&self, user_id: Uuid) -> AppResult<Vec<EventListing>> {
        let rows = sqlx::query_as::<_, EventListing>(
            r#"
            SELECT e.id, e.title, e.description, e.event_date, e.event_time, e.location,
                   e.organizer_id, e.created_at, e.updated_at,
                   u.email AS organizer_email,
                   'organizer'::text AS user_role,
                   NULL::uuid AS invitation_id,
                   NULL::text AS invitation_role,
                   NULL::text AS invitation_status
              FROM events e
              JOIN users u ON u.id = e.organizer_id
             WHERE e.organizer_id = $1
             ORDER BY e.event_date DESC, e.event_time DESC, e.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_invited(&self, user_id: Uuid) -> AppResult<Vec<EventListing>> {
        let rows = sqlx::query_as::<_, EventListing>(
            r#"
            SELECT e.id, e.title, e.description, e.event_date, e.event_time, e.location,
                   e.organizer_id, e.created_at, e.updated_at,
                   u.email AS organizer_email,
                   'attendee'::text AS user_role,
                   ei.id AS invitation_id,
                   ei.role AS invitation_role,
                   ei.status AS invitation_status
              FROM events e
              JOIN event_invitations ei ON ei.event_id = e.id
              JOIN users u ON u.id = e.organizer_id
             WHERE ei.invitee_id = $1
             ORDER BY e.event_date DESC, e.event_time DESC, e.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search_events(
        &self,
        user_id: Uuid,
        filter: &EventSearch,
    ) -> AppResult<Vec<EventListing>> {
        let pattern = filter
            .text
            .as_deref()
            .map(|t| format!("%{}%", escape_like(t)));
        let rows = sqlx::query_as::<_, EventListing>(
            r#"
            SELECT e.id, e.title, e.description, e.event_date, e.event_time, e.location,
                   e.organizer_id, e.created_at, e.updated_at,
                   u.email AS organizer_email,
                   CASE WHEN e.organizer_id = $1 THEN 'organizer' ELSE 'attendee' END
                       AS user_role,
                   ei.id AS invitation_id,
                   ei.role AS invitation_role,
                   ei.status AS invitation_status
              FROM events e
              JOIN users u ON u.id = e.organizer_id
              LEFT JOIN event_invitations ei
                     ON ei.event_id = e.id AND ei.invitee_id = $1
             WHERE (e.organizer_id = $1 OR ei.id IS NOT NULL)
               AND ($2::text IS NULL
                    OR e.title ILIKE $2 ESCAPE '\'
                    OR e.description ILIKE $2 ESCAPE '\'
                    OR e.location ILIKE $2 ESCAPE '\')
               AND ($3::date IS NULL OR e.event_date >= $3)
               AND ($4::date IS NULL OR e.event_date <= $4)
             ORDER BY e.event_date DESC, e.event_time DESC, e.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
