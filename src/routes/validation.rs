use axum::extract::FromRequest;

use crate::constants::ERR_INVALID_RECIPE_ID;
use crate::error::AppError;

/// JSON body extractor whose rejections render as `{"error": ...}` with 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Parse the `:id` path segment of recipe routes
///
/// Only plain decimal digits naming a positive `i32` are accepted.
pub fn parse_recipe_id(raw: &str) -> Result<i32, AppError> {
    let id = if raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse::<i32>().ok().filter(|id| *id > 0)
    } else {
        None
    };

    id.ok_or_else(|| {
        tracing::warn!("Invalid recipe ID: {}", raw);
        AppError::InvalidInput(ERR_INVALID_RECIPE_ID.to_string())
    })
}
