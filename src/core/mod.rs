// Core pipeline exports
pub mod filters;
pub mod geo;
pub mod ranking;

pub use filters::{event_matches, organizer_matches};
pub use geo::distance_miles;
pub use ranking::{rank_events, rank_organizers, EventSortKey, Geolocated, OrganizerSortKey, Ranked};
