use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, FromRow, Postgres, Type,
};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    events::repo_types::{date_format, time_format},
};

pub const DEFAULT_ROLE: &str = "attendee";
pub const ROLES: [&str; 3] = ["attendee", "speaker", "volunteer"];

/// Lifecycle state of an invitation: `pending` until the invitee answers once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }

    /// Applies the invitee's answer. Only `pending → accepted | declined` exists.
    pub fn respond(self, decision: InvitationStatus) -> AppResult<InvitationStatus> {
        match (self, decision) {
            (current, _) if current.is_terminal() => Err(AppError::InvalidState(format!(
                "invitation has already been {current}"
            ))),
            (_, InvitationStatus::Accepted | InvitationStatus::Declined) => Ok(decision),
            _ => Err(AppError::InvalidState(
                "an invitation can only be accepted or declined".into(),
            )),
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "declined" => Ok(InvitationStatus::Declined),
            other => Err(format!("unknown invitation status `{other}`")),
        }
    }
}

// Stored as TEXT guarded by a CHECK constraint.
impl Type<Postgres> for InvitationStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for InvitationStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as Decode<'r, Postgres>>::decode(value)?;
        Ok(raw.parse::<InvitationStatus>()?)
    }
}

impl<'q> Encode<'q, Postgres> for InvitationStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <&str as Encode<'q, Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Invitation record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub event_id: Uuid,
    pub invitee_id: Uuid,
    pub role: String,
    pub status: InvitationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub responded_at: Option<OffsetDateTime>,
}

/// Invitation as shown to the organizer, with the invitee's email.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvitationWithInvitee {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invitation: Invitation,
    pub invitee_email: String,
}

/// Invitation as shown to the invitee, with the event it belongs to.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvitationWithEvent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invitation: Invitation,
    pub event_title: String,
    pub event_description: Option<String>,
    #[serde(with = "date_format")]
    pub event_date: Date,
    #[serde(with = "time_format")]
    pub event_time: Time,
    pub event_location: Option<String>,
    pub organizer_id: Uuid,
    pub organizer_email: String,
}
