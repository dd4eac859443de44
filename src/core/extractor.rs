use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// Message returned whenever a request body cannot be read as JSON at all.
pub const NOT_A_JSON: &str = "Not a JSON";

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl AppJsonRejection {
    /// True when the body is not JSON at all, as opposed to unreadable or mistyped.
    pub fn is_not_json(&self) -> bool {
        matches!(
            self.0,
            JsonRejection::JsonSyntaxError(_) | JsonRejection::MissingJsonContentType(_)
        )
    }
}

impl From<AppJsonRejection> for AppError {
    fn from(rejection: AppJsonRejection) -> Self {
        match rejection.0 {
            // Well-formed JSON whose shape does not fit the target type
            JsonRejection::JsonDataError(err) => {
                AppError::BadRequest(format!("Invalid JSON data: {}", err))
            }
            JsonRejection::JsonSyntaxError(err) => {
                tracing::debug!("Rejected request body: {}", err);
                AppError::BadRequest(NOT_A_JSON.to_string())
            }
            JsonRejection::MissingJsonContentType(err) => {
                tracing::debug!("Rejected request body: {}", err);
                AppError::BadRequest(NOT_A_JSON.to_string())
            }
            // Body could not be read, e.g. over the size limit
            other => AppError::Rejected(other.status(), other.body_text()),
        }
    }
}

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
