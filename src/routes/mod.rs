// Route exports
pub mod auth;
pub mod events;
pub mod organizers;

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::error::{ApiError, ApiResult};
use crate::models::{HealthResponse, User};
use crate::services::{Accounts, Catalog};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub accounts: Accounts,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(events::configure)
            .configure(organizers::configure),
    );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Pull the bearer token out of the Authorization header.
pub(crate) fn bearer_token(req: &HttpRequest) -> ApiResult<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::InvalidToken)
}

/// Resolve the request's bearer token to its user.
pub(crate) async fn current_user(state: &AppState, req: &HttpRequest) -> ApiResult<User> {
    let token = bearer_token(req)?;
    state.accounts.authenticate(token).await
}
