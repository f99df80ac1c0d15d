use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Coordinate, CreateOrganizerRequest, EventCategory, OrganizerFilters, OrganizerPatch,
    OriginQuery,
};
use crate::routes::{current_user, AppState};

/// Configure organizer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Fixed paths registered before the `{id}` catch-all.
    cfg.service(
        web::scope("/organizers")
            .route("", web::get().to(list_organizers))
            .route("", web::post().to(create_organizer))
            .route("/categories/list", web::get().to(list_categories))
            .route("/nearby/top", web::get().to(top_nearby))
            .route("/{id}", web::get().to(get_organizer))
            .route("/{id}", web::put().to(update_organizer))
            .route("/{id}/events", web::get().to(organizer_events)),
    );
}

/// List organizers through the filter/rank pipeline
///
/// GET /api/organizers?search=&categories=&min_rating=&max_distance=
///   &user_lat=&user_lng=&sort_by=&limit=
async fn list_organizers(
    state: web::Data<AppState>,
    query: web::Query<OrganizerFilters>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let organizers = state.catalog.list_organizers(&query).await?;
    Ok(HttpResponse::Ok().json(organizers))
}

/// The closed category list, as wire labels
///
/// GET /api/organizers/categories/list
async fn list_categories() -> HttpResponse {
    let labels: Vec<&str> = EventCategory::all().iter().map(|c| c.as_str()).collect();
    HttpResponse::Ok().json(labels)
}

#[derive(Debug, Deserialize, Validate)]
struct TopNearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    user_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    user_lng: Option<f64>,
    #[validate(range(min = 1.0, max = 100.0))]
    #[serde(default)]
    max_distance: Option<f64>,
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_top_limit")]
    limit: usize,
}

fn default_top_limit() -> usize {
    10
}

/// Top-rated organizers near the caller; the origin is required here
///
/// GET /api/organizers/nearby/top
async fn top_nearby(
    state: web::Data<AppState>,
    query: web::Query<TopNearbyQuery>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let origin = match (query.user_lat, query.user_lng) {
        (Some(lat), Some(lng)) => Coordinate { lat, lng },
        _ => {
            return Err(ApiError::Validation(
                "user_lat and user_lng are required".to_string(),
            ))
        }
    };
    let organizers = state
        .catalog
        .top_nearby(origin, query.max_distance, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(organizers))
}

/// Fetch one organizer
///
/// GET /api/organizers/{id}
async fn get_organizer(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OriginQuery>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let organizer = state.catalog.get_organizer(&path, query.origin()).await?;
    Ok(HttpResponse::Ok().json(organizer))
}

/// Create an organizer (authenticated)
///
/// POST /api/organizers
async fn create_organizer(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateOrganizerRequest>,
) -> ApiResult<HttpResponse> {
    current_user(&state, &req).await?;
    body.validate()?;
    let organizer = state.catalog.create_organizer(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(organizer))
}

/// Apply an allow-listed patch to an organizer (authenticated)
///
/// PUT /api/organizers/{id}
async fn update_organizer(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<OrganizerPatch>,
) -> ApiResult<HttpResponse> {
    current_user(&state, &req).await?;
    body.validate()?;
    let organizer = state
        .catalog
        .update_organizer(&path, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(organizer))
}

/// One organizer's events, nearest first when an origin is supplied
///
/// GET /api/organizers/{id}/events
async fn organizer_events(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OriginQuery>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let events = state.catalog.organizer_events(&path, query.origin()).await?;
    Ok(HttpResponse::Ok().json(events))
}
