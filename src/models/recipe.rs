use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Stored recipe with its surrogate id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i32,
    /// Username of the user who created the recipe
    pub creator: String,
    pub title: String,
    pub content: String,
}

/// Recipe body accepted by create and update; any client-sent `id` is ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub creator: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl NewRecipe {
    /// Reject recipes with empty required fields
    pub fn validate(&self) -> Result<()> {
        if self.creator.trim().is_empty() {
            return Err(AppError::InvalidInput("Creator is required".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }
        Ok(())
    }

    pub fn with_id(self, id: i32) -> Recipe {
        Recipe {
            id,
            creator: self.creator,
            title: self.title,
            content: self.content,
        }
    }
}
