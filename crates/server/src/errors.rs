use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use service::repository::RepositoryError;
use thiserror::Error;
use tracing::error;

/// JSON error response: `{"status": 404, "title": "Not Found", "detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match &e {
            ServiceError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string())),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string())),
            ServiceError::Repository(RepositoryError::InvalidSortColumn { .. }) => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid Sort Column", Some(e.to_string()))
            }
            _ => {
                error!(error = %e, "request failed");
                // storage details stay in the log
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "title": self.title,
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(#[from] models::errors::ModelError),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_service_errors_to_status() {
        assert_eq!(ApiError::from(ServiceError::Validation("x".into())).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(ServiceError::not_found("project")).status(), StatusCode::NOT_FOUND);
        let sort = RepositoryError::InvalidSortColumn { entity: "project".into(), column: "pwd".into() };
        assert_eq!(ApiError::from(ServiceError::from(sort)).status(), StatusCode::BAD_REQUEST);
        let many = RepositoryError::MultipleResults { entity: "project".into() };
        let api = ApiError::from(ServiceError::from(many));
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.detail.is_none());
    }
}
