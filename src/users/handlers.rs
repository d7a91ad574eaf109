use axum::{extract::State, routing::get, Router};
use tracing::instrument;

use super::{
    dto::{UserSearchQuery, UsersResponse},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{Json, Query},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/search", get(search_users))
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<UserSearchQuery>,
) -> AppResult<Json<UsersResponse>> {
    let users = services::search(state.store.as_ref(), user_id, &query.email).await?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}
