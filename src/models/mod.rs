pub mod recipe;
pub mod user;

pub use recipe::{NewRecipe, Recipe};
pub use user::{PublicUser, User, UserProfile};
