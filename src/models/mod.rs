pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Contact, Coordinate, Event, EventCategory, EventReview, Location, Organizer, PriceRange, User,
    UserPreferences,
};
pub use requests::{
    CreateEventRequest, CreateOrganizerRequest, EventFilters, LoginRequest, OrganizerFilters,
    OrganizerPatch, OriginQuery, RegisterRequest, ReviewRequest, UserPatch,
};
pub use responses::{
    AuthResponse, ErrorResponse, EventResponse, HealthResponse, OrganizerResponse, RsvpResponse,
    SaveEventResponse, UserPublic,
};
