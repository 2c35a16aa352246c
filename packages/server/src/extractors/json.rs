use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A JSON body extractor that treats a missing, malformed or non-object body
/// as `{}`.
///
/// Type mismatches inside a well-formed object (e.g. `"files": 3`) are
/// still reported as `AppError::Validation`.
pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let value = match serde_json::from_slice::<Value>(&bytes) {
            Ok(object @ Value::Object(_)) => object,
            _ => Value::Object(Map::new()),
        };

        Ok(LenientJson(from_body(value)?))
    }
}

/// Decode an already-extracted JSON object into a request type.
///
/// Dispatchers that serve several resources on one route extract the body
/// once as a `Value` and decode it here after the target is known.
pub fn from_body<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}
