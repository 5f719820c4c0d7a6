pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::models::{NewRecipe, PublicUser, Recipe, User, UserProfile};

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use postgres::PgStore;

/// Store handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<dyn Store>;

/// Authoritative collection of users and recipes
///
/// Every implementation enforces the same rules: usernames are unique,
/// login failures never reveal whether the username exists, and a recipe's
/// creator must name an existing user when the recipe is written.
#[async_trait]
pub trait Store: Send + Sync {
    /// All users without passwords
    ///
    /// The memory store returns them in insertion order. The `users` table
    /// has no column recording insertion, so Postgres returns whatever order
    /// the scan yields.
    async fn list_users(&self) -> Result<Vec<PublicUser>>;

    async fn register_user(&self, user: User) -> Result<()>;

    /// Succeeds only if `username` exists with exactly `password`
    async fn authenticate(&self, username: &str, password: &str) -> Result<()>;

    async fn get_user(&self, username: &str) -> Result<UserProfile>;

    /// Replace the whole record stored under `username`
    async fn update_user(&self, username: &str, user: User) -> Result<()>;

    async fn delete_user(&self, username: &str) -> Result<()>;

    /// All recipes ordered by id
    async fn list_recipes(&self) -> Result<Vec<Recipe>>;

    async fn get_recipe(&self, id: i32) -> Result<Recipe>;

    /// Insert a recipe and return its assigned id
    async fn create_recipe(&self, recipe: NewRecipe) -> Result<i32>;

    async fn update_recipe(&self, id: i32, recipe: NewRecipe) -> Result<()>;

    async fn delete_recipe(&self, id: i32) -> Result<()>;

    /// Check that the backing storage is reachable
    async fn ping(&self) -> Result<()>;
}

/// Open the store selected by the configuration
pub async fn open_database(config: &Config) -> Result<Db> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
