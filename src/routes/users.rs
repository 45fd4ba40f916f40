use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::{RecipeSummary, SessionUser, UserProfile, UserUpdate},
    routes::AppState,
    services::recipes,
};

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<UserProfile>> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserProfile::from(user)))
}

/// Self-service profile edit; the session record is rewritten to match
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(user_id): Path<i32>,
    Json(update): Json<UserUpdate>,
) -> AppResult<Json<UserProfile>> {
    if current.user.id != user_id {
        return Err(AppError::Forbidden(
            "You can only update your own profile".to_string(),
        ));
    }

    let update = UserUpdate {
        name: update.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        picture: update.picture.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
    };

    let user = state
        .store
        .update_user(user_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    state
        .sessions
        .replace(&current.session_id, &SessionUser::from(&user))
        .await?;

    tracing::info!(user_id, "Profile updated");
    Ok(Json(UserProfile::from(user)))
}

pub async fn recipes_of(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<RecipeSummary>>> {
    let rows = recipes::by_user(state.store.as_ref(), user_id).await?;
    Ok(Json(rows))
}

pub async fn favorites_of(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<RecipeSummary>>> {
    let rows = recipes::favorites_of(state.store.as_ref(), user_id).await?;
    Ok(Json(rows))
}
