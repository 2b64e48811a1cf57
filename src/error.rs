use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::i18n::Translator;

/// Business-rule failures carried out of the service layer. Each variant
/// holds a message-catalog key; translation happens at the handler boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(&'static str),
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error("authentication failed: {0}")]
    Authentication(&'static str),
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("no results: {0}")]
    NoResults(&'static str),
    #[error("internal: {0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_)
            | ApiError::MissingCredential
            | ApiError::InvalidCredential => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::NoResults(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            ApiError::Validation(key)
            | ApiError::Conflict(key)
            | ApiError::Authentication(key)
            | ApiError::NotFound(key)
            | ApiError::NoResults(key)
            | ApiError::Internal(key) => key,
            ApiError::MissingCredential => "error.no_token",
            ApiError::InvalidCredential => "error.invalid_token",
        }
    }

    /// Resolve the catalog key against the request's locale. The empty-result
    /// 404s answer with a `message` field, everything else with `error`.
    pub fn localize(self, t: &Translator) -> ErrorResponse {
        if matches!(self, ApiError::Internal(_)) {
            error!(kind = %self, "request failed");
        }
        let status = self.status();
        let msg = t.t(self.message_key());
        let body = match self {
            ApiError::NoResults(_) => json!({ "message": msg }),
            _ => json!({ "error": msg }),
        };
        ErrorResponse { status, body }
    }
}

/// Localized JSON error, ready to leave the handler.
#[derive(Debug)]
pub struct ErrorResponse {
    status: StatusCode,
    body: serde_json::Value,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{Locale, Translator};

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("error.required_fields").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("error.user_exists").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Authentication("error.invalid_credentials").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::MissingCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("error.file_not_found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::NoResults("error.no_files_found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("error.internal").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn no_results_uses_message_field() {
        let t = Translator::new(Locale::En);
        let resp = ApiError::NoResults("error.no_files_found").localize(&t);
        assert!(resp.body.get("message").is_some());
        assert!(resp.body.get("error").is_none());

        let resp = ApiError::NotFound("error.file_not_found").localize(&t);
        assert!(resp.body.get("error").is_some());
    }
}
