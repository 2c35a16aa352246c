use axum::http::StatusCode;

use crate::error::AppError;

/// CORS preflight. Always `200` with an empty body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".into())
}
