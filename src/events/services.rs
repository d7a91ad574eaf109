use tracing::info;
use uuid::Uuid;

use super::{
    dto::{EventDetails, EventInput},
    repo::EventRepo,
    repo_types::{Event, EventListing, EventSearch, NewEvent},
};
use crate::{
    access::{authorize, Action},
    auth::repo::UserRepo,
    error::{AppError, AppResult},
    store::Store,
};

pub async fn create_event(
    store: &dyn Store,
    organizer_id: Uuid,
    input: NewEvent,
) -> AppResult<Event> {
    let event = store.create_event(organizer_id, &input).await?;
    info!(event_id = %event.id, %organizer_id, "event created");
    Ok(event)
}

pub async fn get_event(store: &dyn Store, user_id: Uuid, event_id: Uuid) -> AppResult<EventDetails> {
    let access = authorize(store, user_id, event_id, Action::View).await?;
    let organizer_email = store
        .find_user_by_id(access.event.organizer_id)
        .await?
        .map(|u| u.email)
        .ok_or(AppError::NotFound("organizer"))?;
    Ok(EventDetails {
        event: access.event,
        organizer_email,
        user_role: access.relationship,
        invitation: access.invitation,
    })
}

pub async fn update_event(
    store: &dyn Store,
    user_id: Uuid,
    event_id: Uuid,
    input: EventInput,
) -> AppResult<Event> {
    let access = authorize(store, user_id, event_id, Action::Edit).await?;
    let changes = input.apply_to(&access.event)?;
    // Deleted between the check and the write.
    let event = store
        .update_event(event_id, &changes)
        .await?
        .ok_or(AppError::NotFound("event"))?;
    info!(%event_id, %user_id, "event updated");
    Ok(event)
}

/// Deletes the event; its invitations and attendance marks go with it.
pub async fn delete_event(store: &dyn Store, user_id: Uuid, event_id: Uuid) -> AppResult<()> {
    authorize(store, user_id, event_id, Action::Delete).await?;
    if !store.delete_event(event_id).await? {
        return Err(AppError::NotFound("event"));
    }
    info!(%event_id, %user_id, "event deleted");
    Ok(())
}

pub async fn list_organized(store: &dyn Store, user_id: Uuid) -> AppResult<Vec<EventListing>> {
    store.find_by_organizer(user_id).await
}

pub async fn list_invited(store: &dyn Store, user_id: Uuid) -> AppResult<Vec<EventListing>> {
    store.find_invited(user_id).await
}

pub async fn search(
    store: &dyn Store,
    user_id: Uuid,
    filter: EventSearch,
) -> AppResult<Vec<EventListing>> {
    store.search_events(user_id, &filter).await
}
