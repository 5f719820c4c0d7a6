use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::Store;
use crate::error::{AppError, Result};
use crate::models::{NewRecipe, PublicUser, Recipe, User, UserProfile};

/// Recipes keyed by id, plus the next id to hand out
#[derive(Debug)]
struct RecipeTable {
    next_id: i32,
    rows: BTreeMap<i32, Recipe>,
}

/// Store that keeps everything in process memory
///
/// Each collection sits behind its own lock. Operations touching both
/// collections always lock `users` before `recipes`.
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    recipes: RwLock<RecipeTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            recipes: RwLock::new(RecipeTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn position(users: &[User], username: &str) -> Option<usize> {
    users.iter().position(|u| u.username == username)
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_users(&self) -> Result<Vec<PublicUser>> {
        let users = self.users.read().await;
        Ok(users.iter().map(User::without_password).collect())
    }

    async fn register_user(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if position(&users, &user.username).is_some() {
            return Err(AppError::UserAlreadyExists);
        }
        users.push(user);
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        let users = self.users.read().await;
        match users.iter().find(|u| u.username == username) {
            Some(user) if user.password.as_bytes() == password.as_bytes() => Ok(()),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn get_user(&self, username: &str) -> Result<UserProfile> {
        let users = self.users.read().await;
        if position(&users, username).is_none() {
            return Err(AppError::UserNotFound);
        }
        let recipes = self.recipes.read().await;
        Ok(UserProfile {
            username: username.to_string(),
            recipes: recipes
                .rows
                .values()
                .filter(|r| r.creator == username)
                .cloned()
                .collect(),
        })
    }

    async fn update_user(&self, username: &str, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        let index = position(&users, username).ok_or(AppError::UserNotFound)?;
        if user.username != username && position(&users, &user.username).is_some() {
            return Err(AppError::UserAlreadyExists);
        }
        users[index] = user;
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<()> {
        let mut users = self.users.write().await;
        let index = position(&users, username).ok_or(AppError::UserNotFound)?;
        users.remove(index);
        Ok(())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let recipes = self.recipes.read().await;
        Ok(recipes.rows.values().cloned().collect())
    }

    async fn get_recipe(&self, id: i32) -> Result<Recipe> {
        let recipes = self.recipes.read().await;
        recipes.rows.get(&id).cloned().ok_or(AppError::RecipeNotFound)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<i32> {
        // Held until the insert completes so the creator cannot vanish in between
        let users = self.users.read().await;
        if position(&users, &recipe.creator).is_none() {
            return Err(AppError::CreatorNotFound);
        }
        let mut recipes = self.recipes.write().await;
        let id = recipes.next_id;
        recipes.next_id += 1;
        recipes.rows.insert(id, recipe.with_id(id));
        Ok(id)
    }

    async fn update_recipe(&self, id: i32, recipe: NewRecipe) -> Result<()> {
        let users = self.users.read().await;
        let mut recipes = self.recipes.write().await;
        let slot = recipes.rows.get_mut(&id).ok_or(AppError::RecipeNotFound)?;
        if position(&users, &recipe.creator).is_none() {
            return Err(AppError::CreatorNotFound);
        }
        *slot = recipe.with_id(id);
        Ok(())
    }

    async fn delete_recipe(&self, id: i32) -> Result<()> {
        let mut recipes = self.recipes.write().await;
        recipes
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::RecipeNotFound)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
