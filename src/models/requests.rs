use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{Contact, Coordinate, EventCategory, Location, PriceRange, UserPreferences};

/// Query parameters for the event listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventFilters {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<EventCategory>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub max_price: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub min_rating: Option<f64>,
    /// Miles; only applied when a user coordinate is supplied.
    #[validate(range(min = 1.0, max = 100.0))]
    #[serde(default = "default_max_distance")]
    pub max_distance: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub user_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub user_lng: Option<f64>,
    /// One of: distance, date, rating, price. Anything else keeps input order.
    #[serde(default = "default_sort")]
    pub sort_by: String,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            min_rating: None,
            max_distance: default_max_distance(),
            user_lat: None,
            user_lng: None,
            sort_by: default_sort(),
            limit: default_limit(),
        }
    }
}

impl EventFilters {
    /// The user coordinate, when both components were supplied.
    pub fn origin(&self) -> Option<Coordinate> {
        match (self.user_lat, self.user_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }
}

/// Query parameters for the organizer listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrganizerFilters {
    #[serde(default)]
    pub search: Option<String>,
    /// Comma-separated category labels; unknown labels are ignored.
    #[serde(default)]
    pub categories: Option<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[validate(range(min = 1.0, max = 100.0))]
    #[serde(default = "default_max_distance")]
    pub max_distance: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub user_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub user_lng: Option<f64>,
    /// One of: distance, rating, events, name. Anything else keeps input order.
    #[serde(default = "default_sort")]
    pub sort_by: String,
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for OrganizerFilters {
    fn default() -> Self {
        Self {
            search: None,
            categories: None,
            min_rating: None,
            max_distance: default_max_distance(),
            user_lat: None,
            user_lng: None,
            sort_by: default_sort(),
            limit: default_limit(),
        }
    }
}

impl OrganizerFilters {
    pub fn origin(&self) -> Option<Coordinate> {
        match (self.user_lat, self.user_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }

    /// Parse the comma-separated `categories` parameter into known categories.
    ///
    /// An all-blank parameter imposes no constraint; a parameter naming only
    /// unknown labels yields an empty list, which matches nothing.
    pub fn category_list(&self) -> Option<Vec<EventCategory>> {
        let labels: Vec<&str> = self
            .categories
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .collect();
        if labels.is_empty() {
            return None;
        }
        Some(
            labels
                .into_iter()
                .filter_map(|label| {
                    EventCategory::all()
                        .iter()
                        .copied()
                        .find(|c| c.as_str() == label)
                })
                .collect(),
        )
    }
}

fn default_sort() -> String {
    "distance".to_string()
}

fn default_limit() -> usize {
    50
}

fn default_max_distance() -> Option<f64> {
    Some(25.0)
}

/// Coordinate pair accepted by detail endpoints for distance annotation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct OriginQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub user_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub user_lng: Option<f64>,
}

impl OriginQuery {
    pub fn origin(&self) -> Option<Coordinate> {
        match (self.user_lat, self.user_lng) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }
}

/// Body for POST /auth/register.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[validate(custom(function = "validate_location_opt"))]
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// Body for POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Body for POST /events.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    pub date: String,
    pub time: String,
    #[validate(custom(function = "validate_location"))]
    pub location: Location,
    pub category: EventCategory,
    pub price: PriceRange,
    #[serde(default)]
    pub image: Option<String>,
    pub organizer_id: String,
}

/// Body for POST /organizers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganizerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[validate(custom(function = "validate_location"))]
    pub location: Location,
    #[serde(default)]
    pub categories: Vec<EventCategory>,
    pub contact: Contact,
}

/// Body for POST /events/{id}/reviews.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(min = 1, max = 1000))]
    pub comment: String,
}

/// Allow-listed profile patch for PUT /auth/me.
///
/// id, email, password and timestamps are not patchable; unknown fields are
/// rejected outright instead of being stripped one by one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[validate(custom(function = "validate_location_opt"))]
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// Allow-listed organizer patch for PUT /organizers/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(deny_unknown_fields)]
pub struct OrganizerPatch {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[validate(custom(function = "validate_location_opt"))]
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub categories: Option<Vec<EventCategory>>,
    #[serde(default)]
    pub contact: Option<Contact>,
}

fn validate_location(location: &Location) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lng) {
        return Err(ValidationError::new("coordinate_out_of_range"));
    }
    Ok(())
}

fn validate_location_opt(location: &Location) -> Result<(), ValidationError> {
    validate_location(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_default_to_pass_through() {
        let filters = EventFilters::default();
        assert!(filters.search.is_none());
        assert_eq!(filters.sort_by, "distance");
        assert_eq!(filters.limit, 50);
        assert_eq!(filters.max_distance, Some(25.0));
        assert!(filters.origin().is_none());
    }

    #[test]
    fn origin_requires_both_components() {
        let mut filters = EventFilters::default();
        filters.user_lat = Some(37.0);
        assert!(filters.origin().is_none());
        filters.user_lng = Some(-122.0);
        assert!(filters.origin().is_some());
    }

    #[test]
    fn category_list_drops_unknown_labels() {
        let mut filters = OrganizerFilters::default();
        filters.categories = Some("Music, Knitting , Business".to_string());
        let parsed = filters.category_list().unwrap();
        assert_eq!(parsed, vec![EventCategory::Music, EventCategory::Business]);

        filters.categories = Some("Knitting".to_string());
        assert_eq!(filters.category_list().unwrap(), vec![]);

        filters.categories = Some(" , ".to_string());
        assert!(filters.category_list().is_none());
    }

    #[test]
    fn user_patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<UserPatch>(r#"{"email":"x@y.z"}"#);
        assert!(err.is_err());

        let ok: UserPatch = serde_json::from_str(r#"{"name":"New Name"}"#).unwrap();
        assert_eq!(ok.name.as_deref(), Some("New Name"));
    }

    #[test]
    fn review_request_bounds() {
        let review = ReviewRequest {
            rating: 6,
            comment: "great".to_string(),
        };
        assert!(review.validate().is_err());

        let review = ReviewRequest {
            rating: 5,
            comment: "great".to_string(),
        };
        assert!(review.validate().is_ok());
    }
}
