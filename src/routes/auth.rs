use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::error::ApiResult;
use crate::models::{LoginRequest, OriginQuery, RegisterRequest, UserPatch, UserPublic};
use crate::routes::{current_user, AppState};

/// Configure authentication and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me))
            .route("/me", web::put().to(update_me))
            .route("/me/saved-events", web::get().to(saved_events)),
    );
}

/// Register a new account
///
/// POST /api/auth/register
async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let response = state.accounts.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Exchange credentials for a bearer token
///
/// POST /api/auth/login
async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let response = state.accounts.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Issue a fresh token for the authenticated user
///
/// POST /api/auth/refresh
async fn refresh(state: web::Data<AppState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &req).await?;
    let response = state.accounts.refresh(user)?;
    Ok(HttpResponse::Ok().json(response))
}

/// Stateless logout; clients drop the token.
///
/// POST /api/auth/logout
async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "logged out" }))
}

/// The authenticated user's profile
///
/// GET /api/auth/me
async fn me(state: web::Data<AppState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &req).await?;
    Ok(HttpResponse::Ok().json(UserPublic::from(user)))
}

/// Update the authenticated user's profile
///
/// PUT /api/auth/me
async fn update_me(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<UserPatch>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &req).await?;
    body.validate()?;
    let updated = state
        .accounts
        .update_profile(&user.id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(UserPublic::from(updated)))
}

/// The authenticated user's saved events, distance-annotated when
/// user_lat/user_lng are supplied
///
/// GET /api/auth/me/saved-events
async fn saved_events(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<OriginQuery>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &req).await?;
    query.validate()?;
    let events = state.catalog.saved_events(&user, query.origin()).await?;
    Ok(HttpResponse::Ok().json(events))
}
