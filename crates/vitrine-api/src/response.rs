//! Response envelope.
//!
//! Every endpoint answers `{ success, data?, message?, error?, errors? }`
//! so storefront and back-office clients share one decoding path.

use serde::Serialize;

/// The JSON envelope around every API response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable note accompanying a success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Human-readable failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Field-level validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            errors: None,
        }
    }

    /// Successful response with a payload and a note.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// Successful response carrying only a note (logout, delete).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            errors: None,
        }
    }

    /// Failure with a single reason.
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
            errors: None,
        }
    }

    /// Validation failure with field-level details.
    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some("validation failed".to_string()),
            errors: Some(errors),
        }
    }
}
