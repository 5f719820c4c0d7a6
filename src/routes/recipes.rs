use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::constants::{MSG_RECIPE_CREATED, MSG_RECIPE_UPDATED};
use crate::error::Result;
use crate::models::{NewRecipe, Recipe};
use crate::routes::users::MessageResponse;
use crate::routes::validation::{parse_recipe_id, AppJson};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateRecipeResponse {
    pub message: String,
    pub recipe_id: i32,
}

pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>> {
    Ok(Json(state.db.list_recipes().await?))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>> {
    let id = parse_recipe_id(&id)?;
    Ok(Json(state.db.get_recipe(id).await?))
}

/// Create a recipe for an existing user
///
/// Returns 400 if the creator does not exist.
pub async fn create_recipe(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewRecipe>,
) -> Result<(StatusCode, Json<CreateRecipeResponse>)> {
    payload.validate()?;

    let creator = payload.creator.clone();
    let recipe_id = state.db.create_recipe(payload).await?;

    tracing::info!("Recipe {} created by {}", recipe_id, creator);
    Ok((
        StatusCode::CREATED,
        Json(CreateRecipeResponse {
            message: MSG_RECIPE_CREATED.to_string(),
            recipe_id,
        }),
    ))
}

/// Replace the recipe stored under `id` with the request body
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<NewRecipe>,
) -> Result<Json<MessageResponse>> {
    let id = parse_recipe_id(&id)?;
    payload.validate()?;
    state.db.update_recipe(id, payload).await?;

    tracing::info!("Recipe {} updated", id);
    Ok(MessageResponse::new(MSG_RECIPE_UPDATED))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_recipe_id(&id)?;
    state.db.delete_recipe(id).await?;

    tracing::info!("Recipe {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}
