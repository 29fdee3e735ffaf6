// HTTP error mapping for store failures
//
// | StoreError | Status | Body detail |
// |------------|--------|-------------|
// | NotFound   | 404    | "Test not found" |
// | Validation | 400    | validation message |
// | Backend    | 500    | "Internal server error" (cause is logged only) |

use autotest_common::error::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            ApiError::NotFound => "Test not found",
            ApiError::BadRequest(message) => message,
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Validation(message) => ApiError::BadRequest(message),
            StoreError::Backend(message) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(error = %cause, "Request failed");
        }

        let body = serde_json::json!({ "detail": self.detail() });
        (self.status_code(), Json(body)).into_response()
    }
}
