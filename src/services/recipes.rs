use serde::Serialize;

use crate::{
    db::RecipeStore,
    error::{AppError, AppResult},
    models::{
        CommentView, Recipe, RecipeDraft, RecipeQuery, RecipeSummary, RelatedVideo, SessionUser,
        ViewerState,
    },
    services::{
        search::{self, RecipeFeed},
        suggestions::{self, Suggestion},
    },
};

/// Full recipe page
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub instructions: Vec<String>,
    pub related_videos: Vec<RelatedVideo>,
    pub comments: Vec<CommentView>,
    #[serde(flatten)]
    pub viewer: ViewerState,
}

/// Fails with `NotFound` unless the recipe exists, returning its owner
pub async fn require_owner(store: &dyn RecipeStore, recipe_id: i32) -> AppResult<i32> {
    store
        .recipe_owner(recipe_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))
}

async fn require_owned_by(
    store: &dyn RecipeStore,
    recipe_id: i32,
    user: &SessionUser,
) -> AppResult<()> {
    let owner = require_owner(store, recipe_id).await?;
    if owner != user.id {
        tracing::warn!(recipe_id, user_id = user.id, owner, "Rejected edit by non-owner");
        return Err(AppError::Forbidden(
            "You can only modify your own recipes".to_string(),
        ));
    }
    Ok(())
}

pub async fn browse(store: &dyn RecipeStore, query: &RecipeQuery) -> AppResult<RecipeFeed> {
    let rows = store.list_recipes().await?;
    let feed = search::build_feed(&rows, query);

    tracing::info!(
        total = rows.len(),
        matched = feed.recipes.len(),
        query = ?query.q,
        "Recipe feed built"
    );

    Ok(feed)
}

pub async fn create(
    store: &dyn RecipeStore,
    user: &SessionUser,
    draft: RecipeDraft,
) -> AppResult<Recipe> {
    let recipe = draft.validate()?;
    let created = store.create_recipe(user.id, &recipe).await?;

    tracing::info!(
        recipe_id = created.id,
        user_id = user.id,
        videos = recipe.related_videos.len(),
        "Recipe created"
    );

    Ok(created)
}

pub async fn update(
    store: &dyn RecipeStore,
    user: &SessionUser,
    recipe_id: i32,
    draft: RecipeDraft,
) -> AppResult<Recipe> {
    let recipe = draft.validate()?;
    require_owned_by(store, recipe_id, user).await?;

    let updated = store
        .update_recipe(recipe_id, &recipe)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    tracing::info!(recipe_id, user_id = user.id, "Recipe updated");
    Ok(updated)
}

pub async fn delete(store: &dyn RecipeStore, user: &SessionUser, recipe_id: i32) -> AppResult<()> {
    require_owned_by(store, recipe_id, user).await?;

    if !store.delete_recipe(recipe_id).await? {
        return Err(AppError::NotFound("Recipe not found".to_string()));
    }

    tracing::info!(recipe_id, user_id = user.id, "Recipe deleted");
    Ok(())
}

pub async fn detail(
    store: &dyn RecipeStore,
    recipe_id: i32,
    viewer: Option<&SessionUser>,
) -> AppResult<RecipeDetail> {
    let row = store
        .find_recipe(recipe_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;

    let related_videos = store.related_videos(recipe_id).await?;
    let comments = store.comments(recipe_id).await?;
    let viewer = match viewer {
        Some(user) => store.viewer_state(recipe_id, user.id).await?,
        None => ViewerState::default(),
    };

    Ok(RecipeDetail {
        summary: RecipeSummary::from(&row),
        instructions: row.recipe.instruction_lines(),
        related_videos,
        comments,
        viewer,
    })
}

pub async fn related_videos(store: &dyn RecipeStore, recipe_id: i32) -> AppResult<Vec<RelatedVideo>> {
    require_owner(store, recipe_id).await?;
    store.related_videos(recipe_id).await
}

pub async fn suggestions_for(store: &dyn RecipeStore, recipe_id: i32) -> AppResult<Vec<Suggestion>> {
    let target = store
        .find_recipe(recipe_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".to_string()))?;
    let pool = store.list_recipes().await?;

    let suggested = suggestions::suggest(&target.recipe, &pool, &mut rand::thread_rng());

    tracing::info!(
        recipe_id,
        pool = pool.len().saturating_sub(1),
        suggested = suggested.len(),
        "Suggestions computed"
    );

    Ok(suggested)
}

pub async fn by_user(store: &dyn RecipeStore, user_id: i32) -> AppResult<Vec<RecipeSummary>> {
    if store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let rows = store.recipes_by_user(user_id).await?;
    Ok(rows.iter().map(RecipeSummary::from).collect())
}

pub async fn favorites_of(store: &dyn RecipeStore, user_id: i32) -> AppResult<Vec<RecipeSummary>> {
    if store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let rows = store.favorites_of_user(user_id).await?;
    Ok(rows.iter().map(RecipeSummary::from).collect())
}
