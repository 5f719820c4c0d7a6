use serde::{Deserialize, Serialize};

use super::Recipe;
use crate::constants::{ERR_RESERVED_USERNAME, RESERVED_USERNAMES};
use crate::error::{AppError, Result};

/// User as submitted on registration, login and update
///
/// The password is stored and compared in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    /// Reject records with empty required fields or a username that
    /// `/users/:id` could never address
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::InvalidInput("Username is required".to_string()));
        }
        if RESERVED_USERNAMES.contains(&self.username.as_str()) {
            return Err(AppError::InvalidInput(ERR_RESERVED_USERNAME.to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::InvalidInput("Password is required".to_string()));
        }
        Ok(())
    }

    /// View of this user that is safe to return to clients
    pub fn without_password(&self) -> PublicUser {
        PublicUser {
            username: self.username.clone(),
        }
    }
}

/// User without the password field, as listed by `GET /users/all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub username: String,
}

/// A single user together with the recipes they created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub recipes: Vec<Recipe>,
}
