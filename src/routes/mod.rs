use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub mod assistant;
pub mod auth;
pub mod media;
pub mod recipes;
pub mod social;
pub mod state;
pub mod users;

pub use state::{AppState, Settings};

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
        .nest("/gemini", assistant_routes())
        .route("/youtube/search", post(media::search_videos))
        .with_state(state)
}

fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/authorize", get(auth::authorize))
        .route("/check", get(auth::check))
        .route("/logout", post(auth::logout))
}

/// Routes under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recipes", get(recipes::list))
        .route("/recipes/submit", post(recipes::submit))
        .route(
            "/recipes/:id",
            get(recipes::get).put(recipes::update).delete(recipes::delete),
        )
        .route("/recipes/:id/related_videos", get(recipes::related_videos))
        .route("/recipes/:id/suggested_recipes", get(recipes::suggested))
        .route("/recipes/:id/like", post(social::like))
        .route("/recipes/:id/favorite", post(social::favorite))
        .route("/recipes/:id/rate", post(social::rate))
        .route("/recipes/:id/comment", post(social::comment))
        .route("/recipes/:id/comments", get(social::comments))
        .route("/users/:id", get(users::profile).put(users::update_profile))
        .route("/users/:id/recipes", get(users::recipes_of))
        .route("/users/:id/favorites", get(users::favorites_of))
        .route("/imgur/upload", post(media::upload_image))
}

fn assistant_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(assistant::generate))
        .route("/parse", post(assistant::parse))
        .route("/check", post(assistant::check))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
