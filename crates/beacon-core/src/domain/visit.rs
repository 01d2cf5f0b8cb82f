use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback value for client fields the beacon did not report.
pub const UNKNOWN: &str = "unknown";

/// Fallback referrer for visits that arrived without one.
pub const DIRECT_REFERRER: &str = "direct";

/// Visit entity - one recorded page view, written exactly once by the
/// ingestion pipeline and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub site_id: Uuid,
    /// Capture time, stamped server-side. The sort key for readers.
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub ip: String,
    pub referrer: String,
    pub language: String,
    pub screen_size: String,
    pub pixel_ratio: String,
    pub viewport: String,
    pub platform: String,
    pub browser_name: String,
    pub browser_version: String,
}

/// Fields the beacon script reports about the visiting browser.
///
/// Every field is optional: the beacon may be old, broken, or stripped by the
/// embedding page. Missing values fall back to literal defaults when the
/// visit is built, never to null.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub referrer: Option<String>,
    pub screen_size: Option<String>,
    pub pixel_ratio: Option<String>,
    pub viewport: Option<String>,
    pub platform: Option<String>,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
}

impl Visit {
    /// Build a visit from what the server observed plus whatever the beacon
    /// reported. ID and timestamp are generated here; client-supplied fields
    /// default independently (`"unknown"`, referrer `"direct"`).
    pub fn new(
        site_id: Uuid,
        user_agent: Option<String>,
        ip: String,
        language: Option<String>,
        client: ClientInfo,
    ) -> Self {
        let unknown = || UNKNOWN.to_string();
        Self {
            id: Uuid::new_v4(),
            site_id,
            timestamp: Utc::now(),
            user_agent: user_agent.unwrap_or_else(unknown),
            ip,
            referrer: client
                .referrer
                .unwrap_or_else(|| DIRECT_REFERRER.to_string()),
            language: language.unwrap_or_else(unknown),
            screen_size: client.screen_size.unwrap_or_else(unknown),
            pixel_ratio: client.pixel_ratio.unwrap_or_else(unknown),
            viewport: client.viewport.unwrap_or_else(unknown),
            platform: client.platform.unwrap_or_else(unknown),
            browser_name: client.browser_name.unwrap_or_else(unknown),
            browser_version: client.browser_version.unwrap_or_else(unknown),
        }
    }
}
