use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{Event, Location, Organizer, User, UserPreferences};

/// An event enriched with per-query derived fields.
///
/// `distance` is computed from the caller's coordinate and never persisted;
/// `organizer` is joined at read time and may be absent if the lookup fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Organizer>,
}

/// An organizer enriched with the derived `distance` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerResponse {
    #[serde(flatten)]
    pub organizer: Organizer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// A user with the password hash stripped, safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub preferences: UserPreferences,
    #[serde(rename = "savedEvents")]
    pub saved_events: Vec<String>,
    #[serde(rename = "createdEvents")]
    pub created_events: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            photo: user.photo,
            location: user.location,
            preferences: user.preferences,
            saved_events: user.saved_events,
            created_events: user.created_events,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response for register/login/refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserPublic,
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

/// Response for POST /events/{id}/rsvp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpResponse {
    pub event_id: String,
    pub attendees: u32,
}

/// Response for POST /events/{id}/save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEventResponse {
    pub event_id: String,
    /// "saved" or "removed".
    pub action: String,
    pub saved_events_count: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error body returned for all failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
