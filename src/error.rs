use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// An empty recommendation list is never an error; only bad input and
/// failures of the graph store are represented here.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Missing or malformed caller input.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The graph store was unreachable, timed out, or rejected the query.
    #[error("Graph store error: {0}")]
    Dependency(String),
}

impl From<neo4rs::Error> for AppError {
    fn from(e: neo4rs::Error) -> Self {
        AppError::Dependency(e.to_string())
    }
}

impl From<neo4rs::DeError> for AppError {
    fn from(e: neo4rs::DeError) -> Self {
        AppError::Dependency(format!("Unexpected row shape: {}", e))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Dependency(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
