pub mod health;
pub mod recipes;
pub mod users;
pub mod validation;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::error::AppError;
use crate::AppState;

pub use health::health_check;
pub use recipes::{create_recipe, delete_recipe, get_recipe, list_recipes, update_recipe};
pub use users::{delete_user, get_user, list_users, login_user, register_user, update_user};

/// User and recipe routes, relative to the API prefix
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users/all", get(list_users))
        .route("/users/register", post(register_user))
        .route("/users/login", post(login_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/recipes/all", get(list_recipes))
        .route("/recipes/create", post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

/// Full application router: health check plus API routes under `prefix`
pub fn router(state: AppState, prefix: &str) -> Router {
    let api = api_routes();
    let app = if prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(prefix, api)
    };

    app.route("/health", get(health_check))
        .fallback(route_not_found)
        .layer(middleware::map_response(json_method_not_allowed))
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

/// Replace axum's empty 405 body with the JSON error shape, keeping `Allow`
async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let mut json = AppError::MethodNotAllowed.into_response();
    if let Some(allow) = response.headers().get(header::ALLOW) {
        json.headers_mut().insert(header::ALLOW, allow.clone());
    }
    json
}
