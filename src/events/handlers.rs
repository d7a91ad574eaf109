use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{EventDetailsResponse, EventInput, EventResponse, EventsResponse, SearchParams},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::{Json, Path, Query},
    state::AppState,
};

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_organized).post(create_event))
        .route("/events/invited", get(list_invited))
        .route("/events/search", get(search_events))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

#[instrument(skip(state))]
pub async fn list_organized(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<EventsResponse>> {
    let events = services::list_organized(state.store.as_ref(), user_id).await?;
    Ok(Json(EventsResponse { events }))
}

#[instrument(skip(state))]
pub async fn list_invited(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<EventsResponse>> {
    let events = services::list_invited(state.store.as_ref(), user_id).await?;
    Ok(Json(EventsResponse { events }))
}

#[instrument(skip(state))]
pub async fn search_events(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<EventsResponse>> {
    let filter = params.validate()?;
    let events = services::search(state.store.as_ref(), user_id, filter).await?;
    Ok(Json(EventsResponse { events }))
}

#[instrument(skip(state, body))]
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<EventInput>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    let input = body.validate()?;
    let event = services::create_event(state.store.as_ref(), user_id, input).await?;
    Ok((StatusCode::CREATED, Json(EventResponse { event })))
}

#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EventDetailsResponse>> {
    let event = services::get_event(state.store.as_ref(), user_id, id).await?;
    Ok(Json(EventDetailsResponse { event }))
}

#[instrument(skip(state, body))]
pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<EventInput>,
) -> AppResult<Json<EventResponse>> {
    let event = services::update_event(state.store.as_ref(), user_id, id, body).await?;
    Ok(Json(EventResponse { event }))
}

#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_event(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
