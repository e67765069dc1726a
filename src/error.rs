use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Error categories surfaced to the caller.
///
/// Persistence and suggestion failures never become an `ApiError`; they are
/// logged and swallowed before reaching the handler's return path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing or rejected credential (401)
    Unauthorized,
    /// Missing image or prompt (400)
    InvalidRequest,
    /// Upstream 429 after the retry budget was spent (429)
    UpstreamRateLimited,
    /// Any other non-2xx or transport failure from the generation API (500)
    Upstream,
    /// The model answered with text only, even after one forced retry (500)
    NoImageReturned,
    /// Server-side configuration error, e.g. missing API key (500)
    Misconfigured,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoImageReturned => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Invalid or missing token",
            Self::InvalidRequest => "Image data and prompt are required",
            Self::UpstreamRateLimited => {
                "Rate limit exceeded. Please try again in a moment."
            }
            Self::Upstream => "Failed to process image with AI",
            Self::NoImageReturned => {
                "AI model returned text instead of an image. This usually happens \
                 with exterior photos. Try using an interior room photo instead."
            }
            Self::Misconfigured => "Server configuration error: API key missing",
        }
    }
}

/// API-layer error with the JSON body shape `{ error, details?, curlCommand? }`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
    pub curl_command: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
            curl_command: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_curl(mut self, curl_command: impl Into<String>) -> Self {
        self.curl_command = Some(curl_command.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(rename = "curlCommand", skip_serializing_if = "Option::is_none")]
    curl_command: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
            curl_command: self.curl_command,
        };
        (self.code.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ErrorCode::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::InvalidRequest.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::UpstreamRateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::NoImageReturned.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn body_skips_empty_fields() {
        let err = ApiError::new(ErrorCode::InvalidRequest);
        let body = serde_json::to_value(ErrorBody {
            error: err.message,
            details: err.details,
            curl_command: err.curl_command,
        })
        .unwrap();
        assert_eq!(body["error"], "Image data and prompt are required");
        assert!(body.get("details").is_none());
        assert!(body.get("curlCommand").is_none());
    }
}
