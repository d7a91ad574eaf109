//! In-process [`Store`] used by unit and router tests.
//!
//! Mirrors the constraints the Postgres schema enforces: case-insensitive
//! unique emails, one invitation per (event, invitee), one attendance mark per
//! (event, user), foreign keys and cascading deletes.

use std::{
    cmp::Reverse,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex, MutexGuard,
    },
};

use axum::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::Store;
use crate::{
    attendance::{
        repo::AttendanceRepo,
        repo_types::{Attendance, AttendanceWithUser},
    },
    auth::{repo::UserRepo, repo_types::User},
    error::{AppError, AppResult},
    events::{
        repo::EventRepo,
        repo_types::{Event, EventListing, EventSearch, NewEvent},
    },
    invitations::{
        repo::InvitationRepo,
        repo_types::{Invitation, InvitationStatus, InvitationWithEvent, InvitationWithInvitee},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<Event>,
    invitations: Vec<Invitation>,
    attendance: Vec<Attendance>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn email_of(&self, id: Uuid) -> String {
        self.user(id).map(|u| u.email.clone()).unwrap_or_default()
    }

    fn event(&self, id: Uuid) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    fn invitation_for(&self, event_id: Uuid, invitee_id: Uuid) -> Option<&Invitation> {
        self.invitations
            .iter()
            .find(|i| i.event_id == event_id && i.invitee_id == invitee_id)
    }

    fn listing(&self, event: &Event, user_id: Uuid) -> EventListing {
        let invitation = self.invitation_for(event.id, user_id);
        EventListing {
            event: event.clone(),
            organizer_email: self.email_of(event.organizer_id),
            user_role: if event.organizer_id == user_id {
                "organizer".into()
            } else {
                "attendee".into()
            },
            invitation_id: invitation.map(|i| i.id),
            invitation_role: invitation.map(|i| i.role.clone()),
            invitation_status: invitation.map(|i| i.status),
        }
    }
}

/// Newest date/time first; among equal keys the later insert comes first.
fn sort_listings(rows: &mut [(usize, EventListing)]) {
    rows.sort_by_key(|(seq, l)| {
        Reverse((l.event.event_date, l.event.event_time, l.event.created_at, *seq))
    });
}

fn referenced() -> AppError {
    AppError::NotFound("referenced record")
}

fn duplicate() -> AppError {
    AppError::Conflict("record already exists".into())
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    invitation_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user with a placeholder password hash.
    pub async fn seed_user(&self, email: &str) -> User {
        self.create_user(email, "not-a-real-hash")
            .await
            .expect("seed user")
    }

    /// Makes `ping` fail as if the database were unreachable.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    /// Number of `find_invitation_for` calls so far.
    pub fn invitation_lookups(&self) -> usize {
        self.invitation_lookups.load(Ordering::SeqCst)
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        let t = self.tables();
        Ok(t.users.iter().find(|u| u.email.to_lowercase() == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables().user(id).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let mut t = self.tables();
        let lower = email.to_lowercase();
        if t.users.iter().any(|u| u.email.to_lowercase() == lower) {
            return Err(duplicate());
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn search_users_by_email(&self, prefix: &str, limit: i64) -> AppResult<Vec<User>> {
        let prefix = prefix.to_lowercase();
        let t = self.tables();
        let mut users: Vec<User> = t
            .users
            .iter()
            .filter(|u| u.email.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(users)
    }
}

#[async_trait]
impl EventRepo for MemoryStore {
    async fn create_event(&self, organizer_id: Uuid, event: &NewEvent) -> AppResult<Event> {
        let mut t = self.tables();
        if t.user(organizer_id).is_none() {
            return Err(referenced());
        }
        let now = OffsetDateTime::now_utc();
        let row = Event {
            id: Uuid::new_v4(),
            title: event.title.clone(),
            description: event.description.clone(),
            event_date: event.event_date,
            event_time: event.event_time,
            location: event.location.clone(),
            organizer_id,
            created_at: now,
            updated_at: now,
        };
        t.events.push(row.clone());
        Ok(row)
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.tables().event(id).cloned())
    }

    async fn update_event(&self, id: Uuid, event: &NewEvent) -> AppResult<Option<Event>> {
        let mut t = self.tables();
        let Some(row) = t.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        row.title = event.title.clone();
        row.description = event.description.clone();
        row.event_date = event.event_date;
        row.event_time = event.event_time;
        row.location = event.location.clone();
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        let mut t = self.tables();
        let before = t.events.len();
        t.events.retain(|e| e.id != id);
        if t.events.len() == before {
            return Ok(false);
        }
        t.invitations.retain(|i| i.event_id != id);
        t.attendance.retain(|a| a.event_id != id);
        Ok(true)
    }

    async fn find_by_organizer(&self, user_id: Uuid) -> AppResult<Vec<EventListing>> {
        let t = self.tables();
        let mut rows: Vec<_> = t
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.organizer_id == user_id)
            .map(|(seq, e)| {
                let mut listing = t.listing(e, user_id);
                listing.invitation_id = None;
                listing.invitation_role = None;
                listing.invitation_status = None;
                (seq, listing)
            })
            .collect();
        sort_listings(&mut rows);
        Ok(rows.into_iter().map(|(_, l)| l).collect())
    }

    async fn find_invited(&self, user_id: Uuid) -> AppResult<Vec<EventListing>> {
        let t = self.tables();
        let mut rows: Vec<_> = t
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| t.invitation_for(e.id, user_id).is_some())
            .map(|(seq, e)| {
                let mut listing = t.listing(e, user_id);
                listing.user_role = "attendee".into();
                (seq, listing)
            })
            .collect();
        sort_listings(&mut rows);
        Ok(rows.into_iter().map(|(_, l)| l).collect())
    }

    async fn search_events(
        &self,
        user_id: Uuid,
        filter: &EventSearch,
    ) -> AppResult<Vec<EventListing>> {
        let needle = filter.text.as_deref().map(str::to_lowercase);
        let matches_text = |e: &Event| match &needle {
            None => true,
            Some(n) => [Some(&e.title), e.description.as_ref(), e.location.as_ref()]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(n.as_str())),
        };

        let t = self.tables();
        let mut rows: Vec<_> = t
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.organizer_id == user_id || t.invitation_for(e.id, user_id).is_some()
            })
            .filter(|(_, e)| matches_text(e))
            .filter(|(_, e)| filter.from.map_or(true, |from| e.event_date >= from))
            .filter(|(_, e)| filter.to.map_or(true, |to| e.event_date <= to))
            .map(|(seq, e)| (seq, t.listing(e, user_id)))
            .collect();
        sort_listings(&mut rows);
        Ok(rows.into_iter().map(|(_, l)| l).collect())
    }
}

#[async_trait]
impl InvitationRepo for MemoryStore {
    async fn create_invitation(
        &self,
        event_id: Uuid,
        invitee_id: Uuid,
        role: &str,
    ) -> AppResult<Invitation> {
        let mut t = self.tables();
        if t.event(event_id).is_none() || t.user(invitee_id).is_none() {
            return Err(referenced());
        }
        if t.invitation_for(event_id, invitee_id).is_some() {
            return Err(duplicate());
        }
        let row = Invitation {
            id: Uuid::new_v4(),
            event_id,
            invitee_id,
            role: role.to_string(),
            status: InvitationStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            responded_at: None,
        };
        t.invitations.push(row.clone());
        Ok(row)
    }

    async fn find_invitation(&self, id: Uuid) -> AppResult<Option<Invitation>> {
        Ok(self.tables().invitations.iter().find(|i| i.id == id).cloned())
    }

    async fn find_invitation_for(
        &self,
        event_id: Uuid,
        invitee_id: Uuid,
    ) -> AppResult<Option<Invitation>> {
        self.invitation_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables().invitation_for(event_id, invitee_id).cloned())
    }

    async fn respond_invitation(
        &self,
        id: Uuid,
        status: InvitationStatus,
    ) -> AppResult<Option<Invitation>> {
        let mut t = self.tables();
        let row = t
            .invitations
            .iter_mut()
            .find(|i| i.id == id && i.status == InvitationStatus::Pending);
        Ok(row.map(|i| {
            i.status = status;
            i.responded_at = Some(OffsetDateTime::now_utc());
            i.clone()
        }))
    }

    async fn revoke_invitation(&self, id: Uuid) -> AppResult<Option<Invitation>> {
        let mut t = self.tables();
        let Some(pos) = t.invitations.iter().position(|i| i.id == id) else {
            return Ok(None);
        };
        let removed = t.invitations.remove(pos);
        t.attendance
            .retain(|a| !(a.event_id == removed.event_id && a.user_id == removed.invitee_id));
        Ok(Some(removed))
    }

    async fn list_invitations_for_event(
        &self,
        event_id: Uuid,
    ) -> AppResult<Vec<InvitationWithInvitee>> {
        let t = self.tables();
        let mut rows: Vec<_> = t
            .invitations
            .iter()
            .filter(|i| i.event_id == event_id)
            .map(|i| InvitationWithInvitee {
                invitation: i.clone(),
                invitee_email: t.email_of(i.invitee_id),
            })
            .collect();
        rows.sort_by_key(|r| r.invitation.created_at);
        Ok(rows)
    }

    async fn list_invitations_for_user(
        &self,
        invitee_id: Uuid,
    ) -> AppResult<Vec<InvitationWithEvent>> {
        let t = self.tables();
        let mut rows: Vec<_> = t
            .invitations
            .iter()
            .enumerate()
            .filter(|(_, i)| i.invitee_id == invitee_id)
            .filter_map(|(seq, i)| {
                let e = t.event(i.event_id)?;
                Some((
                    seq,
                    InvitationWithEvent {
                        invitation: i.clone(),
                        event_title: e.title.clone(),
                        event_description: e.description.clone(),
                        event_date: e.event_date,
                        event_time: e.event_time,
                        event_location: e.location.clone(),
                        organizer_id: e.organizer_id,
                        organizer_email: t.email_of(e.organizer_id),
                    },
                ))
            })
            .collect();
        rows.sort_by_key(|(seq, r)| {
            Reverse((r.event_date, r.event_time, r.invitation.created_at, *seq))
        });
        Ok(rows.into_iter().map(|(_, r)| r).collect())
    }
}

#[async_trait]
impl AttendanceRepo for MemoryStore {
    async fn mark_attendance(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Attendance>> {
        let mut t = self.tables();
        let organizer = t.event(event_id).is_some_and(|e| e.organizer_id == user_id);
        let accepted = t
            .invitation_for(event_id, user_id)
            .is_some_and(|i| i.status == InvitationStatus::Accepted);
        if !(organizer || accepted) {
            return Ok(None);
        }
        if let Some(existing) = t
            .attendance
            .iter()
            .find(|a| a.event_id == event_id && a.user_id == user_id)
        {
            return Ok(Some(existing.clone()));
        }
        let row = Attendance {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            marked_at: OffsetDateTime::now_utc(),
        };
        t.attendance.push(row.clone());
        Ok(Some(row))
    }

    async fn list_attendance(&self, event_id: Uuid) -> AppResult<Vec<AttendanceWithUser>> {
        let t = self.tables();
        let mut rows: Vec<_> = t
            .attendance
            .iter()
            .filter(|a| a.event_id == event_id)
            .map(|a| AttendanceWithUser {
                attendance: a.clone(),
                user_email: t.email_of(a.user_id),
            })
            .collect();
        rows.sort_by_key(|r| r.attendance.marked_at);
        Ok(rows)
    }

    async fn unmark_attendance(&self, event_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut t = self.tables();
        let before = t.attendance.len();
        t.attendance
            .retain(|a| !(a.event_id == event_id && a.user_id == user_id));
        Ok(t.attendance.len() != before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable);
        }
        Ok(())
    }

    async fn close(&self) {}
}
