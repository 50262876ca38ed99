//! Mapping of core failures to HTTP responses.
//!
//! # Invariants
//! - Malformed bodies/queries map to 422 and never reach storage.
//! - Unknown parent references map to 404.
//! - Storage failures map to 503; callers may retry.
//! - Storage failure details are logged, never sent to the client.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use workout_core::{ErrorKind, RepoError};

/// Transport-level error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Required field missing or of the wrong shape.
    Validation(String),
    /// Referenced day or exercise does not exist.
    ReferentialIntegrity(String),
    /// Storage could not be reached or failed the write.
    StorageUnavailable(String),
}

/// JSON body sent with every error status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// `validation|referential_integrity|storage_unavailable`.
    pub error: String,
    pub message: String,
}

/// Client-facing message for every storage failure.
pub const STORAGE_UNAVAILABLE_MESSAGE: &str = "storage unavailable";

impl ApiError {
    /// Logs `detail` and returns the generic storage failure.
    pub fn storage_unavailable(detail: impl Display) -> Self {
        error!(
            "event=storage_failure module=http status=error error_code=storage_unavailable error={detail}"
        );
        Self::StorageUnavailable(STORAGE_UNAVAILABLE_MESSAGE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ReferentialIntegrity(_) => StatusCode::NOT_FOUND,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::ReferentialIntegrity(_) => "referential_integrity",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::ReferentialIntegrity(message)
            | Self::StorageUnavailable(message) => message,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl Error for ApiError {}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value.kind() {
            ErrorKind::ReferentialIntegrity => Self::ReferentialIntegrity(value.to_string()),
            ErrorKind::StorageUnavailable => Self::storage_unavailable(value),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, STORAGE_UNAVAILABLE_MESSAGE};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use workout_core::{RepoError, EXERCISE_DAY_FK};

    #[test]
    fn referential_integrity_maps_to_not_found() {
        let err = ApiError::from(RepoError::ReferentialIntegrity {
            key: EXERCISE_DAY_FK,
            id: 5,
            index: None,
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "referential_integrity");
        assert!(err.to_string().contains("exercise.day_id = 5"));
    }

    #[test]
    fn storage_failures_map_to_service_unavailable() {
        let err = ApiError::from(RepoError::MissingRequiredTable("days"));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), "storage_unavailable");
        assert_eq!(err.to_string(), "storage_unavailable: storage unavailable");
    }

    #[tokio::test]
    async fn storage_failure_body_omits_sqlite_detail() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked while running INSERT INTO sets".to_string()),
        );
        let response = ApiError::from(RepoError::from(sqlite_err)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: super::ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "storage_unavailable");
        assert_eq!(body.message, STORAGE_UNAVAILABLE_MESSAGE);
        assert!(!body.message.contains("INSERT"));
    }
}
