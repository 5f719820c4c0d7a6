use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::constants::{MSG_LOGIN_SUCCESSFUL, MSG_USER_REGISTERED, MSG_USER_UPDATED};
use crate::error::{AppError, Result};
use crate::models::{PublicUser, User, UserProfile};
use crate::routes::validation::AppJson;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// List every user without their password
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>> {
    Ok(Json(state.db.list_users().await?))
}

/// Register a new user
///
/// Returns 409 Conflict if the username is already taken.
pub async fn register_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<User>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    payload.validate()?;

    let username = payload.username.clone();
    state.db.register_user(payload).await.inspect_err(|e| {
        if matches!(e, AppError::UserAlreadyExists) {
            tracing::warn!("Registration rejected, username taken: {}", username);
        }
    })?;

    tracing::info!("New user registered: {}", username);
    Ok((StatusCode::CREATED, MessageResponse::new(MSG_USER_REGISTERED)))
}

/// Check a username/password pair
///
/// Unknown usernames and wrong passwords produce the same 401.
pub async fn login_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<User>,
) -> Result<Json<MessageResponse>> {
    if let Err(e) = state
        .db
        .authenticate(&payload.username, &payload.password)
        .await
    {
        tracing::warn!("Failed login attempt for {}", payload.username);
        return Err(e);
    }

    Ok(MessageResponse::new(MSG_LOGIN_SUCCESSFUL))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.db.get_user(&username).await?))
}

/// Replace the user stored under `username` with the request body
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    AppJson(payload): AppJson<User>,
) -> Result<Json<MessageResponse>> {
    payload.validate()?;
    state.db.update_user(&username, payload).await?;

    tracing::info!("User updated: {}", username);
    Ok(MessageResponse::new(MSG_USER_UPDATED))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    state.db.delete_user(&username).await?;

    tracing::info!("User deleted: {}", username);
    Ok(StatusCode::NO_CONTENT)
}
