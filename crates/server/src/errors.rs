use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::ApiResponse;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Failed request, rendered as an [`ApiResponse`] envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub result: String,
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, result: impl Into<String>, error: impl Into<String>) -> Self {
        Self { status, result: result.into(), error: error.into() }
    }

    /// Log `err` under `context` and map it onto a status and envelope.
    /// `storage_result` labels failures coming from the store itself.
    pub fn service(context: &str, storage_result: &str, err: ServiceError) -> Self {
        error!(context, error = %err, "request failed");
        match err {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, capitalize(&msg), msg),
            ServiceError::Model(e) => Self::new(StatusCode::BAD_REQUEST, "Required data is missing", e.to_string()),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "Error in finding records", msg),
            ServiceError::Storage(e) => Self::new(StatusCode::CONFLICT, storage_result, e.to_string()),
        }
    }

    pub fn bad_json(context: &str, err: serde_json::Error) -> Self {
        error!(context, error = %err, "request body rejected");
        Self::new(StatusCode::BAD_REQUEST, "Error JSON", err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::fail(self.result, self.error))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn capitalize(msg: &str) -> String {
    let mut chars = msg.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::storage::StorageError;

    #[test]
    fn service_errors_map_to_statuses() {
        let e = ApiError::service("t", "Error in saving record", ServiceError::Validation("no ID provided".into()));
        assert_eq!((e.status, e.result.as_str()), (StatusCode::BAD_REQUEST, "No ID provided"));

        let e = ApiError::service("t", "Error in saving record", ServiceError::not_found("records"));
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.error, "no records found");

        let e = ApiError::service("t", "Error in saving record", StorageError::DuplicateIndex(3).into());
        assert_eq!((e.status, e.result.as_str()), (StatusCode::CONFLICT, "Error in saving record"));
        assert_eq!(e.error, "index 3 already exists");
    }
}
