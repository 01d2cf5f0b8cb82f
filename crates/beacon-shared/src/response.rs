//! API response bodies and the tracking pixel payload.

use serde::{Deserialize, Serialize};

/// Error body: `{"error": "..."}` on every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Acknowledgement body: `{"success": true}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessBody {
    pub success: bool,
}

impl SuccessBody {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// The 1x1 transparent GIF returned for every accepted visit.
///
/// The beacon loads it as an image, so a successful ingestion must complete
/// the image load - same 42 bytes on every response, never varying with
/// input.
pub const TRACKING_PIXEL: &[u8; 42] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
    0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9,
    0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x00, 0x02, 0x01, 0x44, 0x00, 0x3B,
];
