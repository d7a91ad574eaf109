use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{
        CreateInvitationRequest, EventInvitationsResponse, InvitationResponse,
        MyInvitationsResponse, RespondRequest,
    },
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{Json, Path},
    state::AppState,
};

pub fn invitation_routes() -> Router<AppState> {
    Router::new()
        .route("/invitations", post(create_invitation).get(my_invitations))
        .route("/invitations/event/:event_id", get(event_invitations))
        .route(
            "/invitations/:id",
            patch(respond_invitation).delete(revoke_invitation),
        )
}

#[instrument(skip(state))]
pub async fn create_invitation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<InvitationResponse>)> {
    let invitation = services::invite(
        state.store.as_ref(),
        user_id,
        body.event_id,
        &body.invitee_email,
        body.role.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(InvitationResponse { invitation })))
}

#[instrument(skip(state))]
pub async fn my_invitations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<MyInvitationsResponse>> {
    let invitations = services::list_for_user(state.store.as_ref(), user_id).await?;
    Ok(Json(MyInvitationsResponse { invitations }))
}

#[instrument(skip(state))]
pub async fn event_invitations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<EventInvitationsResponse>> {
    let invitations = services::list_for_event(state.store.as_ref(), user_id, event_id).await?;
    Ok(Json(EventInvitationsResponse { invitations }))
}

#[instrument(skip(state))]
pub async fn respond_invitation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> AppResult<Json<InvitationResponse>> {
    let decision = body.decision()?;
    let invitation = services::respond(state.store.as_ref(), user_id, id, decision).await?;
    Ok(Json(InvitationResponse { invitation }))
}

#[instrument(skip(state))]
pub async fn revoke_invitation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::revoke(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
