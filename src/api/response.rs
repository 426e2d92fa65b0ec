use crate::api::error::{ApiError, ApiErrorCode};
use serde::Serialize;

/// Envelope for errors and for replies that carry no payload.
///
/// Token pairs, identities and catalog rows are sent bare.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl ApiResponse {
    pub fn done() -> Self {
        ApiResponse {
            success: true,
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}
