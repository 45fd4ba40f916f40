use crate::{
    error::AppResult,
    models::{
        CommentView, Identity, NewRecipe, RatingScore, Recipe, RecipeWithStats, RelatedVideo,
        Toggle, User, UserUpdate, ViewerState,
    },
};

/// Relational storage for users, recipes and their social records
///
/// Handlers only talk to this trait, so the Postgres implementation can be
/// swapped for an in-memory one in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecipeStore: Send + Sync {
    /// Creates the user on first login, otherwise refreshes name and picture
    async fn upsert_user(&self, identity: &Identity) -> AppResult<User>;

    async fn find_user(&self, user_id: i32) -> AppResult<Option<User>>;

    /// Applies a partial profile update, `None` when the user does not exist
    async fn update_user(&self, user_id: i32, update: &UserUpdate) -> AppResult<Option<User>>;

    /// All recipes with aggregates, in storage (id) order
    async fn list_recipes(&self) -> AppResult<Vec<RecipeWithStats>>;

    async fn find_recipe(&self, recipe_id: i32) -> AppResult<Option<RecipeWithStats>>;

    /// Owner of a recipe, `None` when the recipe does not exist
    async fn recipe_owner(&self, recipe_id: i32) -> AppResult<Option<i32>>;

    async fn recipes_by_user(&self, user_id: i32) -> AppResult<Vec<RecipeWithStats>>;

    async fn favorites_of_user(&self, user_id: i32) -> AppResult<Vec<RecipeWithStats>>;

    /// Inserts the recipe and its related videos atomically
    async fn create_recipe(&self, owner_id: i32, recipe: &NewRecipe) -> AppResult<Recipe>;

    /// Replaces the editable fields and the full related-video set atomically
    async fn update_recipe(&self, recipe_id: i32, recipe: &NewRecipe) -> AppResult<Option<Recipe>>;

    /// Deletes the recipe and every dependent record, `false` if nothing was deleted
    async fn delete_recipe(&self, recipe_id: i32) -> AppResult<bool>;

    async fn related_videos(&self, recipe_id: i32) -> AppResult<Vec<RelatedVideo>>;

    async fn toggle_like(&self, recipe_id: i32, user_id: i32) -> AppResult<Toggle>;

    async fn toggle_favorite(&self, recipe_id: i32, user_id: i32) -> AppResult<Toggle>;

    /// Inserts or overwrites the user's rating and returns the new average
    async fn rate(&self, recipe_id: i32, user_id: i32, score: RatingScore) -> AppResult<f64>;

    async fn add_comment(
        &self,
        recipe_id: i32,
        user_id: i32,
        content: &str,
    ) -> AppResult<CommentView>;

    /// Comments on a recipe, oldest first
    async fn comments(&self, recipe_id: i32) -> AppResult<Vec<CommentView>>;

    async fn viewer_state(&self, recipe_id: i32, user_id: i32) -> AppResult<ViewerState>;
}
