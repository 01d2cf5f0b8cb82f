//! Rate limiting middleware for the ingestion endpoint.
//!
//! Admission runs before any other work on the wrapped scope, and the
//! middleware fails CLOSED: a request with no derivable client identity, or
//! a limiter backend failure, is rejected rather than waved through.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use beacon_core::ports::RateLimiter;

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
}

enum Admission {
    Allow,
    Deny { retry_after: Option<Duration> },
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        Box::pin(async move {
            // Client identity: proxy-forwarded address if present, else the
            // peer address.
            let client_key = req
                .connection_info()
                .realip_remote_addr()
                .map(str::to_owned);

            let admission = match client_key.as_deref() {
                None => {
                    tracing::warn!("No client identity on request, failing closed");
                    Admission::Deny { retry_after: None }
                }
                Some(key) => match limiter.check(key).await {
                    Ok(result) if result.allowed => Admission::Allow,
                    Ok(result) => {
                        tracing::warn!(client = key, "Rate limit exceeded");
                        Admission::Deny {
                            retry_after: Some(result.reset_after),
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rate limiter unavailable, failing closed");
                        Admission::Deny { retry_after: None }
                    }
                },
            };

            match admission {
                Admission::Allow => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Admission::Deny { retry_after } => {
                    let mut builder = HttpResponse::TooManyRequests();
                    builder.insert_header(("X-RateLimit-Remaining", "0"));
                    if let Some(retry_after) = retry_after {
                        builder
                            .insert_header(("Retry-After", retry_after.as_secs().to_string()));
                    }
                    let response = builder.finish();

                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use beacon_infra::rate_limit::{InMemoryRateLimiter, RateLimitConfig};

    async fn ok_handler() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    fn limiter(max_requests: u32) -> Arc<dyn RateLimiter> {
        Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        }))
    }

    #[actix_web::test]
    async fn admitted_requests_reach_the_handler() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter(2)))
                .route("/", web::get().to(ok_handler)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .peer_addr("10.1.1.1:40000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn over_limit_requests_get_429() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter(2)))
                .route("/", web::get().to(ok_handler)),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/")
                .peer_addr("10.1.1.2:40000".parse().unwrap())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = test::TestRequest::get()
            .uri("/")
            .peer_addr("10.1.1.2:40000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("Retry-After"));
    }

    #[actix_web::test]
    async fn missing_client_identity_fails_closed() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter(2)))
                .route("/", web::get().to(ok_handler)),
        )
        .await;

        // No peer address and no forwarding headers.
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn forwarded_address_is_the_client_key() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter(1)))
                .route("/", web::get().to(ok_handler)),
        )
        .await;

        // Same peer, different forwarded clients: limited independently.
        for forwarded in ["203.0.113.5", "203.0.113.6"] {
            let req = test::TestRequest::get()
                .uri("/")
                .peer_addr("10.0.0.1:40000".parse().unwrap())
                .insert_header(("X-Forwarded-For", forwarded))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
    }
}
