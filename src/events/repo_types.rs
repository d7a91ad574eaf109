use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::invitations::repo_types::InvitationStatus;

time::serde::format_description!(pub date_format, Date, "[year]-[month]-[day]");
time::serde::format_description!(pub time_format, Time, "[hour]:[minute]:[second]");

/// Event record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "date_format")]
    pub event_date: Date,
    #[serde(with = "time_format")]
    pub event_time: Time,
    pub location: Option<String>,
    pub organizer_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Event row as listed on a dashboard, annotated with how the caller relates to it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub organizer_email: String,
    /// `organizer` or `attendee`.
    pub user_role: String,
    pub invitation_id: Option<Uuid>,
    pub invitation_role: Option<String>,
    pub invitation_status: Option<InvitationStatus>,
}

/// Validated field set for creating or replacing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_date: Date,
    pub event_time: Time,
    pub location: Option<String>,
}

/// Validated search filter; `text` is matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct EventSearch {
    pub text: Option<String>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}
