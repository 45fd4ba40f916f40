use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};

use crate::{
    db::store::RecipeStore,
    error::AppResult,
    models::{
        CommentView, Identity, NewRecipe, RatingScore, Recipe, RecipeWithStats, RelatedVideo,
        Toggle, User, UserUpdate, ViewerState,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the SQL migrations embedded from `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const RECIPE_WITH_STATS: &str = r#"
    SELECT r.id, r.name, r.cover_image, r.ingredients, r.instructions, r.category,
           r.tags, r.characteristics, r.flavors, r.created_by, r.created_at,
           (SELECT COUNT(*) FROM likes l WHERE l.recipe_id = r.id) AS likes,
           (SELECT COUNT(*) FROM comments c WHERE c.recipe_id = r.id) AS comments,
           (SELECT COUNT(*) FROM favorites f WHERE f.recipe_id = r.id) AS favorites,
           (SELECT COALESCE(SUM(ra.score), 0) FROM ratings ra WHERE ra.recipe_id = r.id) AS rating_sum,
           (SELECT COUNT(*) FROM ratings ra WHERE ra.recipe_id = r.id) AS rating_count
    FROM recipes r
"#;

const RECIPE_COLUMNS: &str = "id, name, cover_image, ingredients, instructions, category, \
                              tags, characteristics, flavors, created_by, created_at";

const COMMENT_VIEW: &str = r#"
    SELECT c.id, c.recipe_id, c.user_id, u.name AS user_name, c.content, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

/// Presence-only social records that toggle on repeat
#[derive(Debug, Clone, Copy)]
enum ToggleTable {
    Likes,
    Favorites,
}

impl ToggleTable {
    fn name(self) -> &'static str {
        match self {
            ToggleTable::Likes => "likes",
            ToggleTable::Favorites => "favorites",
        }
    }
}

/// `RecipeStore` backed by PostgreSQL
#[derive(Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn toggle(&self, table: ToggleTable, recipe_id: i32, user_id: i32) -> AppResult<Toggle> {
        let table = table.name();
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(&format!(
            "DELETE FROM {table} WHERE recipe_id = $1 AND user_id = $2"
        ))
        .bind(recipe_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(&format!(
                "INSERT INTO {table} (recipe_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            ))
            .bind(recipe_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE recipe_id = $1"))
                .bind(recipe_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        tracing::debug!(table, recipe_id, user_id, active = removed == 0, count, "Toggled");

        Ok(Toggle {
            active: removed == 0,
            count,
        })
    }

    async fn insert_videos(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i32,
        recipe: &NewRecipe,
    ) -> AppResult<()> {
        for video in &recipe.related_videos {
            sqlx::query("INSERT INTO related_videos (recipe_id, title, url) VALUES ($1, $2, $3)")
                .bind(recipe_id)
                .bind(&video.title)
                .bind(&video.url)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecipeStore for PgRecipeStore {
    async fn upsert_user(&self, identity: &Identity) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, picture)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
                SET name = EXCLUDED.name,
                    picture = COALESCE(EXCLUDED.picture, users.picture)
            RETURNING id, name, email, picture
            "#,
        )
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.picture)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user(&self, user_id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, picture FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, user_id: i32, update: &UserUpdate) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                picture = COALESCE($3, picture)
            WHERE id = $1
            RETURNING id, name, email, picture
            "#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.picture)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_recipes(&self) -> AppResult<Vec<RecipeWithStats>> {
        let rows = sqlx::query_as::<_, RecipeWithStats>(&format!(
            "{RECIPE_WITH_STATS} ORDER BY r.id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_recipe(&self, recipe_id: i32) -> AppResult<Option<RecipeWithStats>> {
        let row = sqlx::query_as::<_, RecipeWithStats>(&format!(
            "{RECIPE_WITH_STATS} WHERE r.id = $1"
        ))
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn recipe_owner(&self, recipe_id: i32) -> AppResult<Option<i32>> {
        let owner = sqlx::query_scalar::<_, i32>("SELECT created_by FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    async fn recipes_by_user(&self, user_id: i32) -> AppResult<Vec<RecipeWithStats>> {
        let rows = sqlx::query_as::<_, RecipeWithStats>(&format!(
            "{RECIPE_WITH_STATS} WHERE r.created_by = $1 ORDER BY r.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn favorites_of_user(&self, user_id: i32) -> AppResult<Vec<RecipeWithStats>> {
        let rows = sqlx::query_as::<_, RecipeWithStats>(&format!(
            "{RECIPE_WITH_STATS} \
             WHERE r.id IN (SELECT fav.recipe_id FROM favorites fav WHERE fav.user_id = $1) \
             ORDER BY r.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create_recipe(&self, owner_id: i32, recipe: &NewRecipe) -> AppResult<Recipe> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes
                (name, cover_image, ingredients, instructions, category, tags,
                 characteristics, flavors, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(&recipe.name)
        .bind(&recipe.cover_image)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(&recipe.category)
        .bind(&recipe.tags)
        .bind(&recipe.characteristics)
        .bind(&recipe.flavors)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_videos(&mut tx, created.id, recipe).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn update_recipe(&self, recipe_id: i32, recipe: &NewRecipe) -> AppResult<Option<Recipe>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET name = $2, cover_image = $3, ingredients = $4, instructions = $5,
                category = $6, tags = $7, characteristics = $8, flavors = $9
            WHERE id = $1
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(recipe_id)
        .bind(&recipe.name)
        .bind(&recipe.cover_image)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(&recipe.category)
        .bind(&recipe.tags)
        .bind(&recipe.characteristics)
        .bind(&recipe.flavors)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM related_videos WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        Self::insert_videos(&mut tx, recipe_id, recipe).await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn delete_recipe(&self, recipe_id: i32) -> AppResult<bool> {
        // Dependent rows go with it through ON DELETE CASCADE
        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn related_videos(&self, recipe_id: i32) -> AppResult<Vec<RelatedVideo>> {
        let videos = sqlx::query_as::<_, RelatedVideo>(
            "SELECT id, recipe_id, title, url FROM related_videos WHERE recipe_id = $1 ORDER BY id",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    async fn toggle_like(&self, recipe_id: i32, user_id: i32) -> AppResult<Toggle> {
        self.toggle(ToggleTable::Likes, recipe_id, user_id).await
    }

    async fn toggle_favorite(&self, recipe_id: i32, user_id: i32) -> AppResult<Toggle> {
        self.toggle(ToggleTable::Favorites, recipe_id, user_id).await
    }

    async fn rate(&self, recipe_id: i32, user_id: i32, score: RatingScore) -> AppResult<f64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO ratings (recipe_id, user_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT (recipe_id, user_id) DO UPDATE
                SET score = EXCLUDED.score, created_at = NOW()
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .bind(score.get())
        .execute(&mut *tx)
        .await?;

        let average: Option<f64> =
            sqlx::query_scalar("SELECT AVG(score)::float8 FROM ratings WHERE recipe_id = $1")
                .bind(recipe_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(average.unwrap_or(0.0))
    }

    async fn add_comment(
        &self,
        recipe_id: i32,
        user_id: i32,
        content: &str,
    ) -> AppResult<CommentView> {
        let comment = sqlx::query_as::<_, CommentView>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (recipe_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, recipe_id, user_id, content, created_at
            )
            SELECT i.id, i.recipe_id, i.user_id, u.name AS user_name, i.content, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn comments(&self, recipe_id: i32) -> AppResult<Vec<CommentView>> {
        let comments = sqlx::query_as::<_, CommentView>(&format!(
            "{COMMENT_VIEW} WHERE c.recipe_id = $1 ORDER BY c.created_at, c.id"
        ))
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn viewer_state(&self, recipe_id: i32, user_id: i32) -> AppResult<ViewerState> {
        let (liked_by_user, favorited_by_user, user_rating): (bool, bool, Option<i32>) =
            sqlx::query_as(
                r#"
                SELECT
                    EXISTS(SELECT 1 FROM likes WHERE recipe_id = $1 AND user_id = $2),
                    EXISTS(SELECT 1 FROM favorites WHERE recipe_id = $1 AND user_id = $2),
                    (SELECT score FROM ratings WHERE recipe_id = $1 AND user_id = $2)
                "#,
            )
            .bind(recipe_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(ViewerState {
            liked_by_user,
            favorited_by_user,
            user_rating,
        })
    }
}
