use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiResult;
use crate::models::{CreateEventRequest, EventFilters, OriginQuery, ReviewRequest};
use crate::routes::{current_user, AppState};

/// Configure event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Fixed prefix registered before the `{id}` catch-all.
    cfg.service(
        web::scope("/events")
            .route("", web::get().to(list_events))
            .route("", web::post().to(create_event))
            .route("/similar/{id}", web::get().to(similar_events))
            .route("/{id}", web::get().to(get_event))
            .route("/{id}/reviews", web::post().to(add_review))
            .route("/{id}/rsvp", web::post().to(rsvp))
            .route("/{id}/save", web::post().to(toggle_save)),
    );
}

/// List events through the filter/rank pipeline
///
/// GET /api/events?search=&category=&min_price=&max_price=&min_rating=
///   &max_distance=&user_lat=&user_lng=&sort_by=&limit=
async fn list_events(
    state: web::Data<AppState>,
    query: web::Query<EventFilters>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let events = state.catalog.list_events(&query).await?;
    tracing::info!("event listing returned {} results", events.len());
    Ok(HttpResponse::Ok().json(events))
}

/// Fetch one event, distance-annotated when an origin is supplied
///
/// GET /api/events/{id}
async fn get_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OriginQuery>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let event = state.catalog.get_event(&path, query.origin()).await?;
    Ok(HttpResponse::Ok().json(event))
}

/// Create an event (authenticated)
///
/// POST /api/events
async fn create_event(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &req).await?;
    body.validate()?;
    let event = state.catalog.create_event(&user, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(event))
}

/// Add a review; the event rating is recomputed atomically
///
/// POST /api/events/{id}/reviews
async fn add_review(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &req).await?;
    body.validate()?;
    let review = state
        .catalog
        .add_review(&path, &user.name, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(review))
}

/// RSVP to an event
///
/// POST /api/events/{id}/rsvp
async fn rsvp(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let response = state.catalog.rsvp(&path).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Toggle an event in the authenticated user's saved list
///
/// POST /api/events/{id}/save
async fn toggle_save(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &req).await?;
    let response = state.catalog.toggle_saved(&user.id, &path).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[derive(Debug, Deserialize, Validate)]
struct SimilarQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    user_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    user_lng: Option<f64>,
    #[validate(range(min = 1, max = 20))]
    #[serde(default = "default_similar_limit")]
    limit: usize,
}

fn default_similar_limit() -> usize {
    5
}

/// Events in the same category near the given one
///
/// GET /api/events/similar/{id}
async fn similar_events(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<SimilarQuery>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let origin = match (query.user_lat, query.user_lng) {
        (Some(lat), Some(lng)) => Some(crate::models::Coordinate { lat, lng }),
        _ => None,
    };
    let events = state.catalog.similar_events(&path, origin, query.limit).await?;
    Ok(HttpResponse::Ok().json(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Contact, CreateOrganizerRequest, EventCategory, Location, PriceRange, RegisterRequest,
    };
    use crate::routes::configure_routes;
    use crate::services::{Accounts, AuthService, Catalog, MemoryStore, Repository};
    use actix_web::{test, web::Data, App};
    use std::sync::Arc;

    fn location(lat: f64, lng: f64) -> Location {
        Location {
            name: "Venue".to_string(),
            address: "1 Main St".to_string(),
            lat,
            lng,
            city: None,
            state: None,
        }
    }

    async fn state_with_event() -> (AppState, String) {
        let store: Arc<dyn Repository> = Arc::new(MemoryStore::new());
        let auth = Arc::new(AuthService::new("test-secret", 3600));
        let catalog = Catalog::new(Arc::clone(&store));
        let accounts = Accounts::new(store, auth);

        let registered = accounts
            .register(RegisterRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "hunter42".to_string(),
                photo: None,
                location: None,
                preferences: None,
            })
            .await
            .unwrap();
        let user = accounts
            .authenticate(&registered.access_token)
            .await
            .unwrap();

        let organizer = catalog
            .create_organizer(CreateOrganizerRequest {
                name: "Bay Shows".to_string(),
                description: "Puts on shows".to_string(),
                photo: None,
                location: location(37.7879, -122.3972),
                categories: vec![EventCategory::Music],
                contact: Contact {
                    email: "org@example.com".to_string(),
                    phone: None,
                },
            })
            .await
            .unwrap();

        let event = catalog
            .create_event(
                &user,
                CreateEventRequest {
                    title: "Jazz Night".to_string(),
                    description: "Live jazz".to_string(),
                    date: "2025-09-01".to_string(),
                    time: "19:00".to_string(),
                    location: location(37.7694, -122.4862),
                    category: EventCategory::Music,
                    price: PriceRange {
                        min: 25.0,
                        max: 75.0,
                        currency: "USD".to_string(),
                    },
                    image: None,
                    organizer_id: organizer.id,
                },
            )
            .await
            .unwrap();

        (AppState { catalog, accounts }, event.id)
    }

    #[actix_web::test]
    async fn similar_route_takes_the_id_after_the_prefix() {
        let (state, event_id) = state_with_event().await;
        let app = test::init_service(
            App::new()
                .app_data(Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/events/similar/{}", event_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        // The single-event fetch still resolves through the catch-all.
        let req = test::TestRequest::get()
            .uri(&format!("/api/events/{}", event_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
