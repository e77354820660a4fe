use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct Location {
    pub venue: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A fight card (e.g. "UFC 300").
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub subtitle: Option<String>,
    pub promotion: String,
    pub date: NaiveDate,
    pub location: Option<Location>,
    pub status: EventStatus,
    #[serde(default)]
    pub total_fights: i32,
    pub poster_image_url: Option<String>,
    #[serde(default)]
    pub picks_locked: bool,
    #[serde(default)]
    pub picks_lock_date: Option<DateTime<Utc>>,
}

impl Event {
    /// Why picks on this card can no longer change, if they can't.
    pub fn pick_lock_reason(&self, now: DateTime<Utc>) -> Option<&'static str> {
        if matches!(self.status, EventStatus::Completed | EventStatus::Cancelled) {
            return Some("Cannot modify picks for completed or cancelled events");
        }
        if self.picks_locked {
            return Some("Picks are locked for this event");
        }
        match self.picks_lock_date {
            Some(lock) if lock <= now => Some("Picks closed for this event"),
            _ => None,
        }
    }
}

/// Regex matching the stored `YYYY-MM-DD` dates of one year.
pub fn year_date_pattern(year: i32) -> String {
    format!("^{year:04}-")
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub id: i64,
    pub name: String,
    pub subtitle: Option<String>,
    pub promotion: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub location: Option<Location>,
    pub poster_image_url: Option<String>,
}

impl From<CreateEventRequest> for Event {
    fn from(req: CreateEventRequest) -> Self {
        Event {
            id: req.id,
            name: req.name,
            subtitle: req.subtitle,
            promotion: req.promotion,
            date: req.date,
            location: req.location,
            status: EventStatus::Scheduled,
            total_fights: 0,
            poster_image_url: req.poster_image_url,
            picks_locked: false,
            picks_lock_date: None,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub subtitle: Option<String>,
    pub promotion: String,
    pub date: String,
    pub location: Option<Location>,
    pub status: EventStatus,
    pub total_fights: i32,
    pub poster_image_url: Option<String>,
    pub picks_locked: bool,
    pub picks_lock_date: Option<String>, // RFC3339
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        EventResponse {
            id: e.id,
            name: e.name,
            subtitle: e.subtitle,
            promotion: e.promotion,
            date: e.date.to_string(),
            location: e.location,
            status: e.status,
            total_fights: e.total_fights,
            poster_image_url: e.poster_image_url,
            picks_locked: e.picks_locked,
            picks_lock_date: e.picks_lock_date.map(|d| d.to_rfc3339()),
        }
    }
}
