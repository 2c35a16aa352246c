use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::Envelope;
use serde::Serialize;

/// A successful envelope paired with its HTTP status.
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    /// `200` with `data`.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::data(data),
        }
    }
}

impl ApiResponse<i32> {
    /// `201` with the generated id as `data`.
    pub fn created(id: i32) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Envelope::data(id),
        }
    }
}

impl ApiResponse<()> {
    /// `200` with only a `message`.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::message(message),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
