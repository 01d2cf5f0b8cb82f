//! Visit ingestion endpoint.
//!
//! The one endpoint open to the whole internet. It leans permissive: a
//! malformed beacon payload still earns its pixel, because the embedding
//! page cannot handle errors. The only fatal gates are a missing site id,
//! an unknown site, and a failed append.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use beacon_core::domain::{ClientInfo, Visit};
use beacon_shared::TRACKING_PIXEL;
use beacon_shared::dto::TrackRequest;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/track
///
/// Rate limiting has already run in middleware when this handler is reached.
pub async fn track(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    // Unparseable body degrades to empty metadata instead of failing the
    // request - old or broken beacons still report their visit.
    let payload = serde_json::from_slice::<TrackRequest>(&body).unwrap_or_default();

    let Some(raw_site_id) = payload.site_id.clone() else {
        return Err(AppError::BadRequest("Site ID not found".to_string()));
    };

    // A site id that is not a UUID cannot name a registered site.
    let site = match Uuid::parse_str(&raw_site_id) {
        Ok(id) => state.sites.find_by_id(id).await?,
        Err(_) => None,
    };
    let Some(site) = site else {
        return Err(AppError::NotFound("Site not found".to_string()));
    };

    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    let user_agent = header_string(&req, header::USER_AGENT);
    let language = header_string(&req, header::ACCEPT_LANGUAGE);

    let visit = Visit::new(
        site.id,
        user_agent,
        ip,
        language,
        ClientInfo {
            referrer: payload.referrer,
            screen_size: payload.screen_size,
            pixel_ratio: payload.pixel_ratio,
            viewport: payload.viewport,
            platform: payload.platform,
            browser_name: payload.browser_name,
            browser_version: payload.browser_version,
        },
    );

    // Durable before the pixel goes out; on failure the beacon sees a
    // failed image load, which it tolerates silently.
    let stored = state.visits.append(visit).await?;
    tracing::debug!(visit_id = %stored.id, site_id = %stored.site_id, "Visit recorded");

    Ok(pixel_response())
}

fn header_string(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// The fixed success response: same 42 bytes for every accepted visit.
fn pixel_response() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/gif")
        .insert_header((header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"))
        .body(&TRACKING_PIXEL[..])
}
