use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, Time};

use super::repo_types::{Event, EventListing, EventSearch, NewEvent};
use crate::{
    access::Relationship,
    error::{AppError, AppResult},
    invitations::repo_types::Invitation,
};

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_LOCATION_LEN: usize = 300;
const MAX_QUERY_LEN: usize = 100;

/// Request body for creating or replacing an event.
#[derive(Debug, Default, Deserialize)]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub location: Option<String>,
}

impl EventInput {
    /// Validates a full event for creation; title, date and time are required.
    pub fn validate(self) -> AppResult<NewEvent> {
        Ok(NewEvent {
            title: validate_title(self.title.as_deref().unwrap_or_default())?,
            event_date: required(self.event_date, "event_date", parse_date)?,
            event_time: required(self.event_time, "event_time", parse_time)?,
            description: optional_text(self.description, "description", MAX_DESCRIPTION_LEN)?,
            location: optional_text(self.location, "location", MAX_LOCATION_LEN)?,
        })
    }

    /// Partial update: omitted fields keep the value in `current`, blank
    /// optional fields clear it.
    pub fn apply_to(self, current: &Event) -> AppResult<NewEvent> {
        Ok(NewEvent {
            title: match self.title {
                Some(t) => validate_title(&t)?,
                None => current.title.clone(),
            },
            event_date: match self.event_date {
                Some(d) => required(Some(d), "event_date", parse_date)?,
                None => current.event_date,
            },
            event_time: match self.event_time {
                Some(t) => required(Some(t), "event_time", parse_time)?,
                None => current.event_time,
            },
            description: match self.description {
                Some(d) => optional_text(Some(d), "description", MAX_DESCRIPTION_LEN)?,
                None => current.description.clone(),
            },
            location: match self.location {
                Some(l) => optional_text(Some(l), "location", MAX_LOCATION_LEN)?,
                None => current.location.clone(),
            },
        })
    }
}

fn validate_title(raw: &str) -> AppResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn required<T>(
    value: Option<String>,
    field: &str,
    parse: fn(&str) -> AppResult<T>,
) -> AppResult<T> {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => parse(s),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

fn optional_text(value: Option<String>, field: &str, max: usize) -> AppResult<Option<String>> {
    let Some(v) = value else { return Ok(None) };
    let v = v.trim();
    if v.is_empty() {
        return Ok(None);
    }
    if v.chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(Some(v.to_string()))
}

/// Accepts `YYYY-MM-DD`, also as the prefix of an ISO-8601 datetime.
pub fn parse_date(s: &str) -> AppResult<Date> {
    let day = match s.find('T') {
        Some(idx) => &s[..idx],
        None => s,
    };
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation("event_date must be formatted as YYYY-MM-DD"))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> AppResult<Time> {
    Time::parse(s, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(s, format_description!("[hour]:[minute]")))
        .map_err(|_| AppError::validation("event_time must be formatted as HH:MM or HH:MM:SS"))
}

/// Query string of `GET /events/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl SearchParams {
    pub fn validate(self) -> AppResult<EventSearch> {
        let text = self
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        if text.as_ref().is_some_and(|q| q.chars().count() > MAX_QUERY_LEN) {
            return Err(AppError::validation("search query too long"));
        }
        let from = self.from.as_deref().filter(|s| !s.is_empty()).map(parse_date).transpose()?;
        let to = self.to.as_deref().filter(|s| !s.is_empty()).map(parse_date).transpose()?;
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(AppError::validation("`from` must not be after `to`"));
            }
        }
        Ok(EventSearch { text, from, to })
    }
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventListing>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event: Event,
}

/// Single event as seen by one caller.
#[derive(Debug, Serialize)]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: Event,
    pub organizer_email: String,
    pub user_role: Relationship,
    pub invitation: Option<Invitation>,
}

#[derive(Debug, Serialize)]
pub struct EventDetailsResponse {
    pub event: EventDetails,
}
