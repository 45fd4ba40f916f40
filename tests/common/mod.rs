//! In-memory backends for driving the router without Postgres, Redis or the
//! third-party APIs.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use recipe_share::{
    db::{RecipeStore, SessionStore},
    error::AppResult,
    models::{
        CommentView, Identity, NewRecipe, ParsedRecipe, RatingScore, Recipe, RecipeDraft,
        RecipeStats, RecipeWithStats, RelatedVideo, SafetyStatus, SafetyVerdict, SessionUser,
        Toggle, User, UserUpdate, Video, ViewerState,
    },
    routes::{create_router, AppState, Settings},
    services::providers::{IdentityProvider, ImageHost, RecipeAssistant, VideoSearch},
};

pub const FRONTEND_URL: &str = "http://frontend.test";

// ============================================================================
// Recipe store
// ============================================================================

#[derive(Default)]
struct StoreInner {
    next_id: i32,
    users: BTreeMap<i32, User>,
    recipes: BTreeMap<i32, Recipe>,
    ratings: HashMap<(i32, i32), i32>,
    likes: HashSet<(i32, i32)>,
    favorites: HashSet<(i32, i32)>,
    comments: Vec<(i32, i32, i32, String)>,
    videos: Vec<RelatedVideo>,
}

impl StoreInner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn stats(&self, recipe_id: i32) -> RecipeStats {
        let scores: Vec<i64> = self
            .ratings
            .iter()
            .filter(|((r, _), _)| *r == recipe_id)
            .map(|(_, s)| i64::from(*s))
            .collect();

        RecipeStats {
            likes: self.likes.iter().filter(|(r, _)| *r == recipe_id).count() as i64,
            comments: self.comments.iter().filter(|c| c.1 == recipe_id).count() as i64,
            favorites: self.favorites.iter().filter(|(r, _)| *r == recipe_id).count() as i64,
            rating_sum: scores.iter().sum(),
            rating_count: scores.len() as i64,
        }
    }

    fn with_stats(&self, recipe: &Recipe) -> RecipeWithStats {
        RecipeWithStats {
            recipe: recipe.clone(),
            stats: self.stats(recipe.id),
        }
    }

    fn comment_view(&self, comment: &(i32, i32, i32, String)) -> CommentView {
        let (id, recipe_id, user_id, content) = comment;
        CommentView {
            id: *id,
            recipe_id: *recipe_id,
            user_id: *user_id,
            user_name: self
                .users
                .get(user_id)
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            content: content.clone(),
            created_at: Utc::now(),
        }
    }

    fn replace_videos(&mut self, recipe_id: i32, recipe: &NewRecipe) {
        self.videos.retain(|v| v.recipe_id != recipe_id);
        for link in &recipe.related_videos {
            let id = self.next_id();
            self.videos.push(RelatedVideo {
                id,
                recipe_id,
                title: link.title.clone(),
                url: link.url.clone(),
            });
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    /// Rows of every kind still pointing at `recipe_id`
    pub async fn dependent_records(&self, recipe_id: i32) -> usize {
        let inner = self.inner.read().await;
        inner.ratings.keys().filter(|(r, _)| *r == recipe_id).count()
            + inner.likes.iter().filter(|(r, _)| *r == recipe_id).count()
            + inner.favorites.iter().filter(|(r, _)| *r == recipe_id).count()
            + inner.comments.iter().filter(|c| c.1 == recipe_id).count()
            + inner.videos.iter().filter(|v| v.recipe_id == recipe_id).count()
    }

    pub async fn rating_rows(&self, recipe_id: i32) -> Vec<i32> {
        let inner = self.inner.read().await;
        inner
            .ratings
            .iter()
            .filter(|((r, _), _)| *r == recipe_id)
            .map(|(_, s)| *s)
            .collect()
    }
}

#[async_trait::async_trait]
impl RecipeStore for MemoryStore {
    async fn upsert_user(&self, identity: &Identity) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.values_mut().find(|u| u.email == identity.email) {
            user.name = identity.name.clone();
            if identity.picture.is_some() {
                user.picture = identity.picture.clone();
            }
            return Ok(user.clone());
        }

        let id = inner.next_id();
        let user = User {
            id,
            name: identity.name.clone(),
            email: identity.email.clone(),
            picture: identity.picture.clone(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: i32) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn update_user(&self, user_id: i32, update: &UserUpdate) -> AppResult<Option<User>> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(&user_id).map(|user| {
            if let Some(name) = &update.name {
                user.name = name.clone();
            }
            if let Some(picture) = &update.picture {
                user.picture = Some(picture.clone());
            }
            user.clone()
        }))
    }

    async fn list_recipes(&self) -> AppResult<Vec<RecipeWithStats>> {
        let inner = self.inner.read().await;
        Ok(inner.recipes.values().map(|r| inner.with_stats(r)).collect())
    }

    async fn find_recipe(&self, recipe_id: i32) -> AppResult<Option<RecipeWithStats>> {
        let inner = self.inner.read().await;
        Ok(inner.recipes.get(&recipe_id).map(|r| inner.with_stats(r)))
    }

    async fn recipe_owner(&self, recipe_id: i32) -> AppResult<Option<i32>> {
        Ok(self
            .inner
            .read()
            .await
            .recipes
            .get(&recipe_id)
            .map(|r| r.created_by))
    }

    async fn recipes_by_user(&self, user_id: i32) -> AppResult<Vec<RecipeWithStats>> {
        let inner = self.inner.read().await;
        Ok(inner
            .recipes
            .values()
            .filter(|r| r.created_by == user_id)
            .map(|r| inner.with_stats(r))
            .collect())
    }

    async fn favorites_of_user(&self, user_id: i32) -> AppResult<Vec<RecipeWithStats>> {
        let inner = self.inner.read().await;
        Ok(inner
            .recipes
            .values()
            .filter(|r| inner.favorites.contains(&(r.id, user_id)))
            .map(|r| inner.with_stats(r))
            .collect())
    }

    async fn create_recipe(&self, owner_id: i32, recipe: &NewRecipe) -> AppResult<Recipe> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let created = Recipe {
            id,
            name: recipe.name.clone(),
            cover_image: recipe.cover_image.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            category: recipe.category.clone(),
            tags: recipe.tags.clone(),
            characteristics: recipe.characteristics.clone(),
            flavors: recipe.flavors.clone(),
            created_by: owner_id,
            created_at: Utc::now(),
        };
        inner.recipes.insert(id, created.clone());
        inner.replace_videos(id, recipe);
        Ok(created)
    }

    async fn update_recipe(&self, recipe_id: i32, recipe: &NewRecipe) -> AppResult<Option<Recipe>> {
        let mut inner = self.inner.write().await;
        let Some(existing) = inner.recipes.get_mut(&recipe_id) else {
            return Ok(None);
        };

        existing.name = recipe.name.clone();
        existing.cover_image = recipe.cover_image.clone();
        existing.ingredients = recipe.ingredients.clone();
        existing.instructions = recipe.instructions.clone();
        existing.category = recipe.category.clone();
        existing.tags = recipe.tags.clone();
        existing.characteristics = recipe.characteristics.clone();
        existing.flavors = recipe.flavors.clone();
        let updated = existing.clone();

        inner.replace_videos(recipe_id, recipe);
        Ok(Some(updated))
    }

    async fn delete_recipe(&self, recipe_id: i32) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.recipes.remove(&recipe_id).is_none() {
            return Ok(false);
        }

        inner.ratings.retain(|(r, _), _| *r != recipe_id);
        inner.likes.retain(|(r, _)| *r != recipe_id);
        inner.favorites.retain(|(r, _)| *r != recipe_id);
        inner.comments.retain(|c| c.1 != recipe_id);
        inner.videos.retain(|v| v.recipe_id != recipe_id);
        Ok(true)
    }

    async fn related_videos(&self, recipe_id: i32) -> AppResult<Vec<RelatedVideo>> {
        let inner = self.inner.read().await;
        Ok(inner
            .videos
            .iter()
            .filter(|v| v.recipe_id == recipe_id)
            .cloned()
            .collect())
    }

    async fn toggle_like(&self, recipe_id: i32, user_id: i32) -> AppResult<Toggle> {
        let mut inner = self.inner.write().await;
        let active = inner.likes.insert((recipe_id, user_id));
        if !active {
            inner.likes.remove(&(recipe_id, user_id));
        }
        let count = inner.stats(recipe_id).likes;
        Ok(Toggle { active, count })
    }

    async fn toggle_favorite(&self, recipe_id: i32, user_id: i32) -> AppResult<Toggle> {
        let mut inner = self.inner.write().await;
        let active = inner.favorites.insert((recipe_id, user_id));
        if !active {
            inner.favorites.remove(&(recipe_id, user_id));
        }
        let count = inner.stats(recipe_id).favorites;
        Ok(Toggle { active, count })
    }

    async fn rate(&self, recipe_id: i32, user_id: i32, score: RatingScore) -> AppResult<f64> {
        let mut inner = self.inner.write().await;
        inner.ratings.insert((recipe_id, user_id), score.get());
        Ok(inner.stats(recipe_id).average_rating())
    }

    async fn add_comment(
        &self,
        recipe_id: i32,
        user_id: i32,
        content: &str,
    ) -> AppResult<CommentView> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let comment = (id, recipe_id, user_id, content.to_string());
        let view = inner.comment_view(&comment);
        inner.comments.push(comment);
        Ok(view)
    }

    async fn comments(&self, recipe_id: i32) -> AppResult<Vec<CommentView>> {
        let inner = self.inner.read().await;
        Ok(inner
            .comments
            .iter()
            .filter(|c| c.1 == recipe_id)
            .map(|c| inner.comment_view(c))
            .collect())
    }

    async fn viewer_state(&self, recipe_id: i32, user_id: i32) -> AppResult<ViewerState> {
        let inner = self.inner.read().await;
        Ok(ViewerState {
            liked_by_user: inner.likes.contains(&(recipe_id, user_id)),
            favorited_by_user: inner.favorites.contains(&(recipe_id, user_id)),
            user_rating: inner.ratings.get(&(recipe_id, user_id)).copied(),
        })
    }
}

// ============================================================================
// Session store
// ============================================================================

#[derive(Default)]
pub struct MemorySessions {
    sessions: RwLock<HashMap<String, SessionUser>>,
    login_states: RwLock<HashSet<String>>,
}

#[async_trait::async_trait]
impl SessionStore for MemorySessions {
    async fn create(&self, user: &SessionUser) -> AppResult<String> {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), user.clone());
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> AppResult<Option<SessionUser>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn replace(&self, session_id: &str, user: &SessionUser) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), user.clone());
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> AppResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn issue_login_state(&self) -> AppResult<String> {
        let state = Uuid::new_v4().simple().to_string();
        self.login_states.write().await.insert(state.clone());
        Ok(state)
    }

    async fn consume_login_state(&self, state: &str) -> AppResult<bool> {
        Ok(self.login_states.write().await.remove(state))
    }

    fn ttl_secs(&self) -> u64 {
        3600
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Treats the authorization code as the user's handle
pub struct FakeIdentity;

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://id.test/authorize?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<Identity> {
        Ok(Identity {
            email: format!("{}@test.local", code),
            name: code.to_string(),
            picture: None,
        })
    }
}

pub struct FakeAssistant;

#[async_trait::async_trait]
impl RecipeAssistant for FakeAssistant {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        Ok(format!("Recipe for {}", prompt))
    }

    async fn parse(&self, text: &str) -> AppResult<ParsedRecipe> {
        Ok(ParsedRecipe {
            menu_name: text.lines().next().unwrap_or_default().to_string(),
            ingredients: vec!["rice".to_string()],
            instructions: vec!["cook".to_string()],
            ..Default::default()
        })
    }

    async fn check(&self, draft: &RecipeDraft) -> AppResult<SafetyVerdict> {
        let name = draft.name.clone().unwrap_or_default();
        let status = if name.to_lowercase().contains("pufferfish") {
            SafetyStatus::NotSafe
        } else {
            SafetyStatus::Safe
        };
        Ok(SafetyVerdict {
            status,
            unsafe_parts: Vec::new(),
            reason: None,
        })
    }
}

#[derive(Default)]
pub struct FakeVideos {
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl VideoSearch for FakeVideos {
    async fn search_videos(&self, keyword: &str) -> AppResult<Vec<Video>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((1..=5)
            .map(|i| Video {
                id: format!("vid{}", i),
                title: format!("{} #{}", keyword, i),
            })
            .collect())
    }
}

pub struct FakeImages;

#[async_trait::async_trait]
impl ImageHost for FakeImages {
    async fn upload(&self, file_name: &str, _bytes: Vec<u8>) -> AppResult<String> {
        Ok(format!("https://i.test/{}", file_name))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub sessions: Arc<MemorySessions>,
    pub videos: Arc<FakeVideos>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let sessions = Arc::new(MemorySessions::default());
        let videos = Arc::new(FakeVideos::default());

        let state = Arc::new(AppState {
            store: store.clone(),
            sessions: sessions.clone(),
            identity: Arc::new(FakeIdentity),
            assistant: Arc::new(FakeAssistant),
            videos: videos.clone(),
            images: Arc::new(FakeImages),
            settings: Settings {
                frontend_url: FRONTEND_URL.to_string(),
                cookie_secure: false,
            },
        });

        let server = TestServer::new(create_router(state)).unwrap();
        Self {
            server,
            store,
            sessions,
            videos,
        }
    }

    /// Registers `name` and opens a session, returning the user id and `Cookie` header
    pub async fn login(&self, name: &str) -> (i32, (HeaderName, HeaderValue)) {
        let user = self
            .store
            .upsert_user(&Identity {
                email: format!("{}@test.local", name),
                name: name.to_string(),
                picture: None,
            })
            .await
            .unwrap();
        let session_id = self
            .sessions
            .create(&SessionUser::from(&user))
            .await
            .unwrap();

        (user.id, cookie_header(&session_id))
    }

    /// Creates a recipe directly in the store
    pub async fn seed_recipe(&self, owner_id: i32, recipe: NewRecipe) -> i32 {
        self.store.create_recipe(owner_id, &recipe).await.unwrap().id
    }
}

pub fn cookie_header(session_id: &str) -> (HeaderName, HeaderValue) {
    (
        header::COOKIE,
        HeaderValue::from_str(&format!("session_id={}", session_id)).unwrap(),
    )
}

pub fn new_recipe(name: &str, ingredients: &[&str]) -> NewRecipe {
    NewRecipe {
        name: name.to_string(),
        cover_image: None,
        ingredients: ingredients.join("\n"),
        instructions: "Cook".to_string(),
        category: None,
        tags: None,
        characteristics: None,
        flavors: None,
        related_videos: Vec::new(),
    }
}
