//! NearMe Events - Location-based event discovery service
//!
//! This library powers the NearMe backend: events and organizers in a
//! document store, filtered and ranked by text, category, price, rating,
//! and great-circle distance from the caller, with bearer-token accounts
//! on top.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{distance_miles, rank_events, rank_organizers};
pub use error::{ApiError, ApiResult};
pub use models::{Event, EventFilters, EventResponse, Organizer, OrganizerFilters, User};
pub use services::{Accounts, AuthService, Catalog, MemoryStore, Repository};
