use async_trait::async_trait;
use sqlx::PgPool;

use super::Store;
use crate::error::{AppError, Result};
use crate::models::{NewRecipe, PublicUser, Recipe, User, UserProfile};

/// Postgres error code for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

const SELECT_RECIPE_COLUMNS: &str = "SELECT id, creator, title, content FROM recipes";

/// Store backed by the `users` and `recipes` tables
///
/// Every write is a single statement. Existence checks are folded into the
/// statement itself so no explicit transactions are needed.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn user_exists(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn recipe_exists(&self, id: i32) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

/// Map a unique constraint violation to a conflict, if the schema has one
fn map_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::UserAlreadyExists
        }
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_users(&self) -> Result<Vec<PublicUser>> {
        let usernames: Vec<String> = sqlx::query_scalar("SELECT username FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(usernames
            .into_iter()
            .map(|username| PublicUser { username })
            .collect())
    }

    async fn register_user(&self, user: User) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO users (username, password) \
             SELECT $1::text, $2::text \
             WHERE NOT EXISTS (SELECT 1 FROM users WHERE username = $1::text)",
        )
        .bind(&user.username)
        .bind(&user.password)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserAlreadyExists);
        }
        Ok(())
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            Some(stored) if stored.as_bytes() == password.as_bytes() => Ok(()),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn get_user(&self, username: &str) -> Result<UserProfile> {
        if !self.user_exists(username).await? {
            return Err(AppError::UserNotFound);
        }

        let recipes: Vec<Recipe> =
            sqlx::query_as(&format!("{SELECT_RECIPE_COLUMNS} WHERE creator = $1 ORDER BY id"))
                .bind(username)
                .fetch_all(&self.pool)
                .await?;

        Ok(UserProfile {
            username: username.to_string(),
            recipes,
        })
    }

    async fn update_user(&self, username: &str, user: User) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET username = $2::text, password = $3::text \
             WHERE username = $1::text \
             AND ($1::text = $2::text \
                  OR NOT EXISTS (SELECT 1 FROM users WHERE username = $2::text))",
        )
        .bind(username)
        .bind(&user.username)
        .bind(&user.password)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        if self.user_exists(username).await? {
            Err(AppError::UserAlreadyExists)
        } else {
            Err(AppError::UserNotFound)
        }
    }

    async fn delete_user(&self, username: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let recipes = sqlx::query_as(&format!("{SELECT_RECIPE_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    async fn get_recipe(&self, id: i32) -> Result<Recipe> {
        sqlx::query_as(&format!("{SELECT_RECIPE_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::RecipeNotFound)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<i32> {
        let id: Option<i32> = sqlx::query_scalar(
            "INSERT INTO recipes (creator, title, content) \
             SELECT $1::text, $2::text, $3::text \
             WHERE EXISTS (SELECT 1 FROM users WHERE username = $1::text) \
             RETURNING id",
        )
        .bind(&recipe.creator)
        .bind(&recipe.title)
        .bind(&recipe.content)
        .fetch_optional(&self.pool)
        .await?;

        id.ok_or(AppError::CreatorNotFound)
    }

    async fn update_recipe(&self, id: i32, recipe: NewRecipe) -> Result<()> {
        let result = sqlx::query(
            "UPDATE recipes SET creator = $2::text, title = $3::text, content = $4::text \
             WHERE id = $1 \
             AND EXISTS (SELECT 1 FROM users WHERE username = $2::text)",
        )
        .bind(id)
        .bind(&recipe.creator)
        .bind(&recipe.title)
        .bind(&recipe.content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        if self.recipe_exists(id).await? {
            Err(AppError::CreatorNotFound)
        } else {
            Err(AppError::RecipeNotFound)
        }
    }

    async fn delete_recipe(&self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::RecipeNotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{postgres::PgPoolOptions, Executor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SCHEMA_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Fresh schema holding both tables, so tests don't see each other's rows
    async fn scratch_store() -> (PgStore, PgPool, String) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let schema = format!(
            "recipes_test_{}_{}",
            std::process::id(),
            SCHEMA_COUNTER.fetch_add(1, Ordering::SeqCst)
        );

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        admin
            .execute(format!("CREATE SCHEMA {schema}").as_str())
            .await
            .unwrap();

        let search_path = schema.clone();
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .after_connect(move |conn, _meta| {
                let sql = format!("SET search_path TO {search_path}");
                Box::pin(async move {
                    conn.execute(sql.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .unwrap();

        pool.execute(
            "CREATE TABLE users (username TEXT NOT NULL, password TEXT NOT NULL); \
             CREATE TABLE recipes (id SERIAL PRIMARY KEY, creator TEXT NOT NULL, \
             title TEXT NOT NULL, content TEXT NOT NULL)",
        )
        .await
        .unwrap();

        (PgStore::new(pool), admin, schema)
    }

    async fn drop_schema(admin: PgPool, schema: String) {
        admin
            .execute(format!("DROP SCHEMA {schema} CASCADE").as_str())
            .await
            .unwrap();
    }

    fn user(username: &str, password: &str) -> User {
        User {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn recipe(creator: &str, title: &str) -> NewRecipe {
        NewRecipe {
            creator: creator.to_string(),
            title: title.to_string(),
            content: format!("How to make {title}"),
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn test_duplicate_registration_keeps_original() {
        let (store, admin, schema) = scratch_store().await;

        store.register_user(user("alice", "secret")).await.unwrap();
        let result = store.register_user(user("alice", "other")).await;
        assert!(matches!(result, Err(AppError::UserAlreadyExists)));

        assert_eq!(store.list_users().await.unwrap().len(), 1);
        assert!(store.authenticate("alice", "secret").await.is_ok());
        assert!(matches!(
            store.authenticate("alice", "other").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            store.authenticate("nobody", "secret").await,
            Err(AppError::InvalidCredentials)
        ));

        drop_schema(admin, schema).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn test_update_user_rename_and_missing() {
        let (store, admin, schema) = scratch_store().await;
        store.register_user(user("alice", "secret")).await.unwrap();
        store.register_user(user("bob", "pw")).await.unwrap();

        let clash = store.update_user("alice", user("bob", "x")).await;
        assert!(matches!(clash, Err(AppError::UserAlreadyExists)));
        assert!(store.authenticate("alice", "secret").await.is_ok());

        store
            .update_user("alice", user("alice", "changed"))
            .await
            .unwrap();
        assert!(store.authenticate("alice", "changed").await.is_ok());

        store
            .update_user("alice", user("alicia", "changed"))
            .await
            .unwrap();
        assert!(matches!(
            store.get_user("alice").await,
            Err(AppError::UserNotFound)
        ));
        assert!(store.get_user("alicia").await.is_ok());

        let missing = store.update_user("ghost", user("ghost", "pw")).await;
        assert!(matches!(missing, Err(AppError::UserNotFound)));
        assert_eq!(store.list_users().await.unwrap().len(), 2);

        drop_schema(admin, schema).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn test_delete_user_twice() {
        let (store, admin, schema) = scratch_store().await;
        store.register_user(user("alice", "secret")).await.unwrap();

        store.delete_user("alice").await.unwrap();
        assert!(matches!(
            store.delete_user("alice").await,
            Err(AppError::UserNotFound)
        ));
        assert!(store.list_users().await.unwrap().is_empty());

        drop_schema(admin, schema).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch Postgres database"]
    async fn test_recipe_lifecycle() {
        let (store, admin, schema) = scratch_store().await;
        store.register_user(user("alice", "secret")).await.unwrap();

        let orphan = store.create_recipe(recipe("nobody", "Tea")).await;
        assert!(matches!(orphan, Err(AppError::CreatorNotFound)));
        assert!(store.list_recipes().await.unwrap().is_empty());

        let tea = recipe("alice", "Tea");
        let id = store.create_recipe(tea.clone()).await.unwrap();
        assert_eq!(store.get_recipe(id).await.unwrap(), tea.with_id(id));
        assert_eq!(store.get_user("alice").await.unwrap().recipes.len(), 1);

        store
            .update_recipe(id, recipe("alice", "Green Tea"))
            .await
            .unwrap();
        assert_eq!(store.get_recipe(id).await.unwrap().title, "Green Tea");

        let bad_creator = store.update_recipe(id, recipe("nobody", "Coffee")).await;
        assert!(matches!(bad_creator, Err(AppError::CreatorNotFound)));
        let missing = store.update_recipe(id + 1, recipe("alice", "Coffee")).await;
        assert!(matches!(missing, Err(AppError::RecipeNotFound)));
        assert_eq!(store.get_recipe(id).await.unwrap().title, "Green Tea");

        store.delete_recipe(id).await.unwrap();
        assert!(matches!(
            store.delete_recipe(id).await,
            Err(AppError::RecipeNotFound)
        ));
        assert!(matches!(
            store.get_recipe(id).await,
            Err(AppError::RecipeNotFound)
        ));

        drop_schema(admin, schema).await;
    }
}
