//! HTTP error handling
//!
//! Every failed request answers with the same JSON body; the status is
//! derived from the machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use carehub_core::services::ContentServiceError;
use serde::{Deserialize, Serialize};

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(message, "INVALID_INPUT")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, "UNAUTHORIZED")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message, "FORBIDDEN")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            code if code.ends_with("_NOT_FOUND") => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_INPUT" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "STORE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ContentServiceError> for HttpError {
    fn from(err: ContentServiceError) -> Self {
        let code = err.code();
        match &err {
            ContentServiceError::StoreUnavailable(reason) => {
                HttpError::with_details("Content store unavailable", code, reason.clone())
            }
            _ => HttpError::new(err.to_string(), code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carehub_core::operations::TreeOperationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            ("TAB_NOT_FOUND", StatusCode::NOT_FOUND),
            ("CONTENT_NOT_FOUND", StatusCode::NOT_FOUND),
            ("VALIDATION_ERROR", StatusCode::BAD_REQUEST),
            ("INVALID_INPUT", StatusCode::BAD_REQUEST),
            ("UNAUTHORIZED", StatusCode::UNAUTHORIZED),
            ("FORBIDDEN", StatusCode::FORBIDDEN),
            ("STORE_UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE),
            ("NOT_LOADED", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            assert_eq!(HttpError::new("x", code).status(), status, "{}", code);
        }
    }

    #[test]
    fn test_from_service_error() {
        let err: HttpError =
            ContentServiceError::from(TreeOperationError::tab_not_found("caregiver", "t9")).into();
        assert_eq!(err.code, "TAB_NOT_FOUND");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: HttpError = ContentServiceError::store_unavailable("offline").into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.message, "Content store unavailable");
        assert_eq!(err.details.as_deref(), Some("offline"));
    }

    #[test]
    fn test_details_are_omitted_when_absent() {
        let body = serde_json::to_value(HttpError::invalid_input("bad")).unwrap();
        assert_eq!(body, serde_json::json!({"message": "bad", "code": "INVALID_INPUT"}));
    }
}
