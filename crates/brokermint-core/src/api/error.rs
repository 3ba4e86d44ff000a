use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The service rejected (or required) the credential. Raised by any
    /// endpoint; the gateway reports it to the session controller before
    /// returning it.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Validation or business failure, message taken verbatim from the service.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape used by the compliance service: `{"error": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the service's own message out of an error body, if it sent one.
    fn service_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.error)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::service_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(message.unwrap_or_default()),
            400..=499 => ApiError::Rejected {
                status: status.as_u16(),
                message: message
                    .unwrap_or_else(|| format!("Request failed with status {}", status)),
            },
            500..=599 => ApiError::ServerError(
                message.unwrap_or_else(|| format!("Service returned status {}", status)),
            ),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Message suitable for showing on the screen that issued the call.
    ///
    /// Service-provided messages pass through unchanged; transport problems
    /// collapse to a generic description.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(message) if message.is_empty() => {
                "Authentication failed".to_string()
            }
            ApiError::Unauthorized(message) => message.clone(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::ServerError(message) => message.clone(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to reach the compliance service. Check your connection.".to_string()
            }
            ApiError::InvalidResponse(_) => {
                "The compliance service returned an unexpected response.".to_string()
            }
        }
    }
}
