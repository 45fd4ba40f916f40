use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{CommentRequest, CommentView, RateRequest},
    routes::AppState,
    services::social,
};

pub async fn like(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let toggle = social::toggle_like(state.store.as_ref(), &current.user, recipe_id).await?;
    Ok(Json(json!({ "liked": toggle.active, "likes": toggle.count })))
}

pub async fn favorite(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> AppResult<Json<Value>> {
    let toggle = social::toggle_favorite(state.store.as_ref(), &current.user, recipe_id).await?;
    Ok(Json(json!({ "favorited": toggle.active, "favorites": toggle.count })))
}

pub async fn rate(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(recipe_id): Path<i32>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<Value>> {
    let average = social::rate(state.store.as_ref(), &current.user, recipe_id, &request).await?;
    Ok(Json(json!({
        "message": "Rating submitted successfully",
        "average_rating": average,
    })))
}

pub async fn comment(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(recipe_id): Path<i32>,
    Json(request): Json<CommentRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let view = social::comment(
        state.store.as_ref(),
        &current.user,
        recipe_id,
        request.comment.as_deref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Comment added successfully", "comment": view })),
    ))
}

pub async fn comments(
    State(state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> AppResult<Json<Vec<CommentView>>> {
    let comments = social::comments(state.store.as_ref(), recipe_id).await?;
    Ok(Json(comments))
}
