use tracing::{info, warn};
use uuid::Uuid;

use super::{
    repo::InvitationRepo,
    repo_types::{
        Invitation, InvitationStatus, InvitationWithEvent, InvitationWithInvitee, DEFAULT_ROLE,
        ROLES,
    },
};
use crate::{
    access::{authorize, Action},
    auth::{
        repo::UserRepo,
        services::{is_valid_email, normalize_email},
    },
    error::{AppError, AppResult},
    store::Store,
};

fn validate_role(role: Option<&str>) -> AppResult<&'static str> {
    let role = role.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(DEFAULT_ROLE);
    ROLES
        .iter()
        .copied()
        .find(|r| r.eq_ignore_ascii_case(role))
        .ok_or_else(|| {
            AppError::validation(format!("role must be one of: {}", ROLES.join(", ")))
        })
}

/// Invites the user registered under `invitee_email` to the organizer's event.
pub async fn invite(
    store: &dyn Store,
    caller: Uuid,
    event_id: Uuid,
    invitee_email: &str,
    role: Option<&str>,
) -> AppResult<Invitation> {
    let access = authorize(store, caller, event_id, Action::ManageInvitations).await?;

    let email = normalize_email(invitee_email);
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid invitee email"));
    }
    let role = validate_role(role)?;

    let invitee = store
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    if invitee.id == access.event.organizer_id {
        return Err(AppError::InvalidTarget(
            "The organizer cannot be invited to their own event".into(),
        ));
    }

    // The (event, invitee) unique constraint is the arbiter for concurrent invites.
    let invitation = store
        .create_invitation(event_id, invitee.id, role)
        .await
        .map_err(|e| e.conflict_as("User is already invited to this event"))?;
    info!(invitation_id = %invitation.id, %event_id, invitee_id = %invitee.id, "invitation sent");
    Ok(invitation)
}

/// Accepts or declines the caller's own pending invitation.
pub async fn respond(
    store: &dyn Store,
    caller: Uuid,
    invitation_id: Uuid,
    decision: InvitationStatus,
) -> AppResult<Invitation> {
    let invitation = store
        .find_invitation(invitation_id)
        .await?
        .ok_or(AppError::NotFound("invitation"))?;

    authorize(store, caller, invitation.event_id, Action::Respond).await?;
    if invitation.invitee_id != caller {
        warn!(%caller, %invitation_id, "respond to someone else's invitation");
        return Err(AppError::Forbidden);
    }

    let next = invitation.status.respond(decision)?;
    let updated = store
        .respond_invitation(invitation_id, next)
        .await?
        .ok_or_else(|| AppError::InvalidState("invitation has already been answered".into()))?;
    info!(%invitation_id, status = %updated.status, "invitation answered");
    Ok(updated)
}

pub async fn list_for_event(
    store: &dyn Store,
    caller: Uuid,
    event_id: Uuid,
) -> AppResult<Vec<InvitationWithInvitee>> {
    authorize(store, caller, event_id, Action::ManageInvitations).await?;
    store.list_invitations_for_event(event_id).await
}

pub async fn list_for_user(store: &dyn Store, user_id: Uuid) -> AppResult<Vec<InvitationWithEvent>> {
    store.list_invitations_for_user(user_id).await
}

/// Withdraws an invitation; the invitee loses any attendance mark for the event.
pub async fn revoke(store: &dyn Store, caller: Uuid, invitation_id: Uuid) -> AppResult<()> {
    let invitation = store
        .find_invitation(invitation_id)
        .await?
        .ok_or(AppError::NotFound("invitation"))?;
    authorize(store, caller, invitation.event_id, Action::ManageInvitations).await?;
    store
        .revoke_invitation(invitation_id)
        .await?
        .ok_or(AppError::NotFound("invitation"))?;
    info!(%invitation_id, event_id = %invitation.event_id, "invitation revoked");
    Ok(())
}
