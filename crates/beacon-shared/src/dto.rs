//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Deserializer, Serialize};

/// Beacon payload posted to the tracking endpoint.
///
/// Every field is optional and the whole body may be garbage: a broken
/// beacon still gets its pixel, so parsing this must never hard-fail.
/// `pixelRatio` arrives as a number from `window.devicePixelRatio` or as a
/// string from older beacons; both normalize to a string here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackRequest {
    pub site_id: Option<String>,
    pub referrer: Option<String>,
    pub screen_size: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub pixel_ratio: Option<String>,
    pub viewport: Option<String>,
    pub platform: Option<String>,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
}

/// Accept a JSON string or number; anything else counts as absent.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Request to login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request to change the admin password.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request to register a new tracked site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSiteRequest {
    pub name: String,
    pub url: String,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Public view of the authenticated admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResponse {
    pub id: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_request_accepts_numeric_pixel_ratio() {
        let req: TrackRequest =
            serde_json::from_str(r#"{"siteId":"abc","pixelRatio":2}"#).unwrap();
        assert_eq!(req.pixel_ratio.as_deref(), Some("2"));

        let req: TrackRequest = serde_json::from_str(r#"{"pixelRatio":1.5}"#).unwrap();
        assert_eq!(req.pixel_ratio.as_deref(), Some("1.5"));

        let req: TrackRequest = serde_json::from_str(r#"{"pixelRatio":"3"}"#).unwrap();
        assert_eq!(req.pixel_ratio.as_deref(), Some("3"));
    }

    #[test]
    fn track_request_tolerates_missing_and_junk_fields() {
        let req: TrackRequest = serde_json::from_str("{}").unwrap();
        assert!(req.site_id.is_none());
        assert!(req.referrer.is_none());

        // A beacon sending nonsense for pixelRatio is treated as silent.
        let req: TrackRequest = serde_json::from_str(r#"{"pixelRatio":[1,2]}"#).unwrap();
        assert!(req.pixel_ratio.is_none());
    }
}
