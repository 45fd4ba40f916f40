use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::{CurrentUser, MaybeUser},
    models::{Recipe, RecipeDraft, RecipeQuery},
    routes::AppState,
    services::{
        recipes::{self, RecipeDetail},
        search::RecipeFeed,
    },
};

/// `GET /api/recipes`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeQuery>,
) -> AppResult<Json<RecipeFeed>> {
    let feed = recipes::browse(state.store.as_ref(), &query).await?;
    Ok(Json(feed))
}

/// `POST /api/recipes/submit`
pub async fn submit(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(draft): Json<RecipeDraft>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let recipe = recipes::create(state.store.as_ref(), &current.user, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Recipe created successfully", "recipe": recipe })),
    ))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(recipe_id): Path<i32>,
) -> AppResult<Json<RecipeDetail>> {
    let detail = recipes::detail(state.store.as_ref(), recipe_id, viewer.as_ref()).await?;
    Ok(Json(detail))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(recipe_id): Path<i32>,
    Json(draft): Json<RecipeDraft>,
) -> AppResult<Json<Recipe>> {
    let recipe = recipes::update(state.store.as_ref(), &current.user, recipe_id, draft).await?;
    Ok(Json(recipe))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> AppResult<Json<Value>> {
    recipes::delete(state.store.as_ref(), &current.user, recipe_id).await?;
    Ok(Json(json!({ "message": "Recipe deleted successfully" })))
}

pub async fn related_videos(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let videos = recipes::related_videos(state.store.as_ref(), recipe_id).await?;
    Ok(Json(json!({ "related_videos": videos })))
}

pub async fn suggested(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let suggested = recipes::suggestions_for(state.store.as_ref(), recipe_id).await?;
    Ok(Json(json!({ "suggested_recipes": suggested })))
}
