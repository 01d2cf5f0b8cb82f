//! HTTP handlers and route configuration.

mod auth;
mod health;
mod sites;
mod track;
mod visits;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::web;

use beacon_core::ports::RateLimiter;

use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
///
/// The track scope is deliberately different from the rest of the API: any
/// origin may POST to it without credentials, and the rate limiter wraps it
/// outermost so admission runs before everything - preflights included.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Arc<dyn RateLimiter>) {
    let cors = Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["POST", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .send_wildcard();

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/track")
                    .route("", web::post().to(track::track))
                    .wrap(cors)
                    .wrap(RateLimitMiddleware::new(limiter)),
            )
            // Admin routes (bearer token required)
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/change-password", web::post().to(auth::change_password)),
            )
            .service(
                web::scope("/sites")
                    .route("", web::post().to(sites::create))
                    .route("", web::get().to(sites::list))
                    .route("/{id}", web::get().to(sites::get))
                    .route("/{id}/visits", web::get().to(sites::list_visits)),
            )
            .route("/visits", web::get().to(visits::list)),
    );
}
