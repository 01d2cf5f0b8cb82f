//! Authentication handlers for the admin surface.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use beacon_core::ports::{PasswordService, TokenService};
use beacon_shared::dto::{AdminResponse, AuthResponse, ChangePasswordRequest, LoginRequest};
use beacon_shared::response::SuccessBody;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let admin = state
        .admins
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password_service
        .verify(&req.password, &admin.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = token_service
        .generate_token(admin.id, &admin.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(username = %admin.username, "Admin logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(AdminResponse {
        id: identity.admin_id.to_string(),
        username: identity.username,
    }))
}

/// POST /api/auth/change-password - Protected route
pub async fn change_password(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    identity: Identity,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Current password and new password are required".to_string(),
        ));
    }

    let mut admin = state
        .admins
        .find_by_id(identity.admin_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let valid = password_service
        .verify(&req.current_password, &admin.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    admin.password_hash = password_service
        .hash(&req.new_password)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    state.admins.save(admin).await?;

    tracing::info!(username = %identity.username, "Admin password changed");

    Ok(HttpResponse::Ok().json(SuccessBody::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use beacon_core::domain::Admin;
    use beacon_core::ports::AdminRepository;
    use beacon_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use beacon_infra::database::{
        InMemoryAdminRepository, InMemorySiteRepository, InMemoryVisitStore,
    };
    use beacon_shared::ErrorBody;

    async fn state_with_admin(password: &str) -> AppState {
        let password_service = Argon2PasswordService::new();
        let admins = Arc::new(InMemoryAdminRepository::new());
        admins
            .save(Admin::new(
                "admin".to_string(),
                password_service.hash(password).unwrap(),
            ))
            .await
            .unwrap();

        AppState {
            sites: Arc::new(InMemorySiteRepository::new()),
            visits: Arc::new(InMemoryVisitStore::new()),
            admins,
        }
    }

    fn services() -> (Arc<dyn TokenService>, Arc<dyn PasswordService>) {
        (
            Arc::new(JwtTokenService::new(JwtConfig {
                secret: "test-secret".to_string(),
                expiration_hours: 1,
                issuer: "test".to_string(),
            })),
            Arc::new(Argon2PasswordService::new()),
        )
    }

    macro_rules! auth_app {
        ($state:expr) => {{
            let (token_service, password_service) = services();
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(web::Data::new(token_service))
                    .app_data(web::Data::new(password_service))
                    .route("/api/auth/login", web::post().to(login))
                    .route("/api/auth/me", web::get().to(me))
                    .route(
                        "/api/auth/change-password",
                        web::post().to(change_password),
                    ),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn login_returns_a_usable_token() {
        let state = state_with_admin("admin123").await;
        let app = auth_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"username": "admin", "password": "admin123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let auth: AuthResponse = test::read_body_json(resp).await;
        assert_eq!(auth.token_type, "Bearer");

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header((
                actix_web::http::header::AUTHORIZATION,
                format!("Bearer {}", auth.access_token),
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let admin: AdminResponse = test::read_body_json(resp).await;
        assert_eq!(admin.username, "admin");
    }

    #[actix_web::test]
    async fn wrong_password_is_401() {
        let state = state_with_admin("admin123").await;
        let app = auth_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"username": "admin", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "Invalid credentials");
    }

    #[actix_web::test]
    async fn missing_fields_are_400() {
        let state = state_with_admin("admin123").await;
        let app = auth_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"username": "admin"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "Username and password are required");
    }

    #[actix_web::test]
    async fn me_without_token_is_401() {
        let state = state_with_admin("admin123").await;
        let app = auth_app!(state);

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn change_password_requires_the_current_one() {
        let state = state_with_admin("admin123").await;
        let admins = state.admins.clone();
        let app = auth_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"username": "admin", "password": "admin123"}))
            .to_request();
        let auth: AuthResponse =
            test::read_body_json(test::call_service(&app, req).await).await;
        let bearer = format!("Bearer {}", auth.access_token);

        // Wrong current password
        let req = test::TestRequest::post()
            .uri("/api/auth/change-password")
            .insert_header((actix_web::http::header::AUTHORIZATION, bearer.clone()))
            .set_json(serde_json::json!({
                "currentPassword": "wrong", "newPassword": "next-password"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.error, "Current password is incorrect");

        // Correct current password
        let req = test::TestRequest::post()
            .uri("/api/auth/change-password")
            .insert_header((actix_web::http::header::AUTHORIZATION, bearer))
            .set_json(serde_json::json!({
                "currentPassword": "admin123", "newPassword": "next-password"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let stored = admins.find_by_username("admin").await.unwrap().unwrap();
        let verifier = Argon2PasswordService::new();
        assert!(verifier
            .verify("next-password", &stored.password_hash)
            .unwrap());
    }
}
