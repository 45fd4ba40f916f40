use crate::{
    db::RecipeStore,
    error::{AppError, AppResult},
    models::{CommentView, RateRequest, SessionUser, Toggle},
    services::recipes::require_owner,
};

pub async fn toggle_like(store: &dyn RecipeStore, user: &SessionUser, recipe_id: i32) -> AppResult<Toggle> {
    require_owner(store, recipe_id).await?;
    let toggle = store.toggle_like(recipe_id, user.id).await?;

    tracing::info!(recipe_id, user_id = user.id, liked = toggle.active, likes = toggle.count, "Like toggled");
    Ok(toggle)
}

pub async fn toggle_favorite(
    store: &dyn RecipeStore,
    user: &SessionUser,
    recipe_id: i32,
) -> AppResult<Toggle> {
    require_owner(store, recipe_id).await?;
    let toggle = store.toggle_favorite(recipe_id, user.id).await?;

    tracing::info!(
        recipe_id,
        user_id = user.id,
        favorited = toggle.active,
        favorites = toggle.count,
        "Favorite toggled"
    );
    Ok(toggle)
}

/// Upserts the caller's rating and returns the recipe's new average, rounded
pub async fn rate(
    store: &dyn RecipeStore,
    user: &SessionUser,
    recipe_id: i32,
    request: &RateRequest,
) -> AppResult<f64> {
    let score = request.score()?;
    require_owner(store, recipe_id).await?;

    let average = store.rate(recipe_id, user.id, score).await?;
    tracing::info!(recipe_id, user_id = user.id, score = score.get(), "Recipe rated");

    Ok((average * 10.0).round() / 10.0)
}

pub async fn comment(
    store: &dyn RecipeStore,
    user: &SessionUser,
    recipe_id: i32,
    text: Option<&str>,
) -> AppResult<CommentView> {
    let content = text
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Comment cannot be empty".to_string()))?;
    require_owner(store, recipe_id).await?;

    let view = store.add_comment(recipe_id, user.id, content).await?;
    tracing::info!(recipe_id, user_id = user.id, comment_id = view.id, "Comment added");

    Ok(view)
}

pub async fn comments(store: &dyn RecipeStore, recipe_id: i32) -> AppResult<Vec<CommentView>> {
    require_owner(store, recipe_id).await?;
    store.comments(recipe_id).await
}
