//! Site management handlers - the admin surface of the site registry.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use beacon_core::domain::Site;
use beacon_shared::dto::CreateSiteRequest;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/sites
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateSiteRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.is_empty() || req.url.is_empty() {
        return Err(AppError::BadRequest("Name and URL are required".to_string()));
    }

    let site = state.sites.save(Site::new(req.name, req.url)).await?;
    tracing::info!(site_id = %site.id, name = %site.name, "Site registered");

    Ok(HttpResponse::Created().json(site))
}

/// GET /api/sites
pub async fn list(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    let sites = state.sites.find_all().await?;
    Ok(HttpResponse::Ok().json(sites))
}

/// GET /api/sites/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let site = find_site(&state, &path).await?;
    Ok(HttpResponse::Ok().json(site))
}

/// GET /api/sites/{id}/visits
pub async fn list_visits(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let site = find_site(&state, &path).await?;
    let visits = state.visits.find_by_site(site.id).await?;
    Ok(HttpResponse::Ok().json(visits))
}

/// Path ids are raw strings; anything that is not a known site's UUID is a
/// plain 404, same as the ingestion path.
async fn find_site(state: &AppState, raw_id: &str) -> Result<Site, AppError> {
    let site = match Uuid::parse_str(raw_id) {
        Ok(id) => state.sites.find_by_id(id).await?,
        Err(_) => None,
    };
    site.ok_or_else(|| AppError::NotFound("Site not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use std::sync::Arc;

    use beacon_core::ports::{PasswordService, TokenService};
    use beacon_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use beacon_infra::database::{
        InMemoryAdminRepository, InMemorySiteRepository, InMemoryVisitStore,
    };
    use beacon_shared::ErrorBody;

    fn empty_state() -> AppState {
        AppState {
            sites: Arc::new(InMemorySiteRepository::new()),
            visits: Arc::new(InMemoryVisitStore::new()),
            admins: Arc::new(InMemoryAdminRepository::new()),
        }
    }

    fn token_service() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }))
    }

    macro_rules! sites_app {
        ($state:expr, $tokens:expr) => {{
            let password_service: Arc<dyn PasswordService> =
                Arc::new(Argon2PasswordService::new());
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(web::Data::new($tokens))
                    .app_data(web::Data::new(password_service))
                    .service(
                        web::scope("/api/sites")
                            .route("", web::post().to(create))
                            .route("", web::get().to(list))
                            .route("/{id}", web::get().to(get))
                            .route("/{id}/visits", web::get().to(list_visits)),
                    ),
            )
            .await
        }};
    }

    fn bearer(tokens: &Arc<dyn TokenService>) -> String {
        let token = tokens
            .generate_token(uuid::Uuid::new_v4(), "admin")
            .unwrap();
        format!("Bearer {token}")
    }

    #[actix_web::test]
    async fn create_then_fetch_round_trip() {
        let state = empty_state();
        let tokens = token_service();
        let auth = bearer(&tokens);
        let app = sites_app!(state, tokens);

        let req = test::TestRequest::post()
            .uri("/api/sites")
            .insert_header((actix_web::http::header::AUTHORIZATION, auth.clone()))
            .set_json(serde_json::json!({"name": "My Blog", "url": "https://blog.example"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Site = test::read_body_json(resp).await;
        assert_eq!(created.name, "My Blog");

        let req = test::TestRequest::get()
            .uri(&format!("/api/sites/{}", created.id))
            .insert_header((actix_web::http::header::AUTHORIZATION, auth))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched: Site = test::read_body_json(resp).await;
        assert_eq!(fetched.id, created.id);
    }

    #[actix_web::test]
    async fn create_without_url_is_400() {
        let state = empty_state();
        let tokens = token_service();
        let auth = bearer(&tokens);
        let app = sites_app!(state, tokens);

        let req = test::TestRequest::post()
            .uri("/api/sites")
            .insert_header((actix_web::http::header::AUTHORIZATION, auth))
            .set_json(serde_json::json!({"name": "My Blog"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "Name and URL are required");
    }

    #[actix_web::test]
    async fn unknown_site_is_404() {
        let state = empty_state();
        let tokens = token_service();
        let auth = bearer(&tokens);
        let app = sites_app!(state, tokens);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sites/{}", uuid::Uuid::new_v4()))
            .insert_header((actix_web::http::header::AUTHORIZATION, auth))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "Site not found");
    }

    #[actix_web::test]
    async fn listing_requires_auth() {
        let state = empty_state();
        let tokens = token_service();
        let app = sites_app!(state, tokens);

        let req = test::TestRequest::get().uri("/api/sites").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn site_visits_are_scoped_and_newest_first() {
        use beacon_core::domain::{ClientInfo, Visit};

        let state = empty_state();
        let site = state
            .sites
            .save(Site::new("A".to_string(), "https://a.example".to_string()))
            .await
            .unwrap();
        let other = state
            .sites
            .save(Site::new("B".to_string(), "https://b.example".to_string()))
            .await
            .unwrap();

        let mut old = Visit::new(site.id, None, "ip".to_string(), None, ClientInfo::default());
        old.timestamp = chrono::Utc::now() - chrono::TimeDelta::minutes(5);
        state.visits.append(old.clone()).await.unwrap();
        let new = state
            .visits
            .append(Visit::new(
                site.id,
                None,
                "ip".to_string(),
                None,
                ClientInfo::default(),
            ))
            .await
            .unwrap();
        state
            .visits
            .append(Visit::new(
                other.id,
                None,
                "ip".to_string(),
                None,
                ClientInfo::default(),
            ))
            .await
            .unwrap();

        let tokens = token_service();
        let auth = bearer(&tokens);
        let app = sites_app!(state, tokens);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sites/{}/visits", site.id))
            .insert_header((actix_web::http::header::AUTHORIZATION, auth))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let visits: Vec<Visit> = test::read_body_json(resp).await;
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].id, new.id);
        assert_eq!(visits[1].id, old.id);
    }
}
