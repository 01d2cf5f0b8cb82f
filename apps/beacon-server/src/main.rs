//! # Beacon Server
//!
//! The main entry point for the Actix-web HTTP server: the visit ingestion
//! endpoint plus the admin reporting API.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;

use beacon_core::ports::{PasswordService, TokenService};
use beacon_infra::auth::{Argon2PasswordService, JwtTokenService};

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Beacon tracking server on {}:{}",
        config.host,
        config.port
    );

    // Auth services
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

    // Build application state and the ingestion rate limiter
    let state = AppState::new(&config, password_service.as_ref()).await;
    let limiter = state::build_rate_limiter().await;

    // Start HTTP server
    HttpServer::new(move || {
        let limiter = limiter.clone();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::new(password_service.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,beacon_server=debug,beacon_infra=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}
