//! Visit reporting handlers.

use actix_web::{HttpResponse, web};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/visits - all visits across sites, newest first.
pub async fn list(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let visits = state.visits.find_recent().await?;
    Ok(HttpResponse::Ok().json(visits))
}
