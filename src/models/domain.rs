use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
///
/// Range checks (lat in [-90, 90], lng in [-180, 180]) happen at the request
/// boundary; everything below this point treats coordinates as valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// A named place with its coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl Location {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// The closed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "Music")]
    Music,
    #[serde(rename = "Food & Drink")]
    FoodDrink,
    #[serde(rename = "Networking")]
    Networking,
    #[serde(rename = "Health & Wellness")]
    HealthWellness,
    #[serde(rename = "Arts & Culture")]
    ArtsCulture,
    #[serde(rename = "Sports & Recreation")]
    SportsRecreation,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Business")]
    Business,
    #[serde(rename = "Community")]
    Community,
    #[serde(rename = "Entertainment")]
    Entertainment,
}

impl EventCategory {
    /// The wire/display label for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Music => "Music",
            EventCategory::FoodDrink => "Food & Drink",
            EventCategory::Networking => "Networking",
            EventCategory::HealthWellness => "Health & Wellness",
            EventCategory::ArtsCulture => "Arts & Culture",
            EventCategory::SportsRecreation => "Sports & Recreation",
            EventCategory::Education => "Education",
            EventCategory::Business => "Business",
            EventCategory::Community => "Community",
            EventCategory::Entertainment => "Entertainment",
        }
    }

    /// All categories, in declaration order.
    pub fn all() -> &'static [EventCategory] {
        &[
            EventCategory::Music,
            EventCategory::FoodDrink,
            EventCategory::Networking,
            EventCategory::HealthWellness,
            EventCategory::ArtsCulture,
            EventCategory::SportsRecreation,
            EventCategory::Education,
            EventCategory::Business,
            EventCategory::Community,
            EventCategory::Entertainment,
        ]
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket price range for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Organizer contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A single user review attached to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReview {
    pub id: String,
    pub user: String,
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// An event as persisted in the `events` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// ISO date string (YYYY-MM-DD); lexicographic order is chronological.
    pub date: String,
    /// Start time in HH:MM format.
    pub time: String,
    pub location: Location,
    pub category: EventCategory,
    pub price: PriceRange,
    #[serde(default)]
    pub image: Option<String>,
    pub organizer_id: String,
    #[serde(default)]
    pub attendees: u32,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub reviews: Vec<EventReview>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// An organizer as persisted in the `organizers` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organizer {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub photo: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub categories: Vec<EventCategory>,
    pub contact: Contact,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(rename = "totalEvents", default)]
    pub total_events: u32,
    #[serde(rename = "recentEvents", default)]
    pub recent_events: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Per-user discovery preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub categories: Vec<EventCategory>,
    #[serde(rename = "maxDistance", default = "default_max_distance")]
    pub max_distance: u16,
    #[serde(rename = "priceRange", default)]
    pub price_range: PriceRange,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            max_distance: default_max_distance(),
            price_range: PriceRange::default(),
        }
    }
}

fn default_max_distance() -> u16 {
    25
}

/// A user account as persisted in the `users` collection.
///
/// The stored `password` field holds the bcrypt hash, never the plaintext.
/// API responses go through [`crate::models::UserPublic`], which drops it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(rename = "savedEvents", default)]
    pub saved_events: Vec<String>,
    #[serde(rename = "createdEvents", default)]
    pub created_events: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_rating() -> f64 {
    5.0
}
