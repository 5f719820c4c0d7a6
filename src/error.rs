use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::{
    ERR_CREATOR_NOT_FOUND, ERR_INVALID_CREDENTIALS, ERR_INVALID_JSON, ERR_METHOD_NOT_ALLOWED,
    ERR_RECIPE_NOT_FOUND, ERR_ROUTE_NOT_FOUND, ERR_USER_ALREADY_EXISTS, ERR_USER_NOT_FOUND,
};

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON rejection: {0}")]
    Json(#[from] JsonRejection),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Recipe not found")]
    RecipeNotFound,

    #[error("Creator username does not exist")]
    CreatorNotFound,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Json(ref e) => {
                tracing::warn!("Rejected request body: {}", e.body_text());
                (StatusCode::BAD_REQUEST, ERR_INVALID_JSON)
            }
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, ERR_INVALID_CREDENTIALS),
            AppError::UserAlreadyExists => (StatusCode::CONFLICT, ERR_USER_ALREADY_EXISTS),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND),
            AppError::RecipeNotFound => (StatusCode::NOT_FOUND, ERR_RECIPE_NOT_FOUND),
            AppError::CreatorNotFound => (StatusCode::BAD_REQUEST, ERR_CREATOR_NOT_FOUND),
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, ERR_ROUTE_NOT_FOUND),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, ERR_METHOD_NOT_ALLOWED),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
