use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            message: Some(message),
            errors,
        }
    }
}

/// The `{}` body returned by successful deletes
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EmptyObject {}
