use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Invitation, InvitationStatus, InvitationWithEvent, InvitationWithInvitee};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub event_id: Uuid,
    pub invitee_email: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub status: String,
}

impl RespondRequest {
    pub fn decision(&self) -> AppResult<InvitationStatus> {
        self.status
            .trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| AppError::validation("status must be `accepted` or `declined`"))
    }
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub invitation: Invitation,
}

#[derive(Debug, Serialize)]
pub struct EventInvitationsResponse {
    pub invitations: Vec<InvitationWithInvitee>,
}

#[derive(Debug, Serialize)]
pub struct MyInvitationsResponse {
    pub invitations: Vec<InvitationWithEvent>,
}
