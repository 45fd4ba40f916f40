use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use super::{Cache, CacheKey};
use crate::{error::AppResult, models::SessionUser};

/// Lifetime of an OAuth login attempt
const LOGIN_STATE_TTL: u64 = 600;
const LOGIN_STATE_LEN: usize = 32;

/// Server-side session records keyed by an opaque identifier
///
/// Injected into the router state so handlers never reach for a global
/// connection.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a new session and returns its identifier
    async fn create(&self, user: &SessionUser) -> AppResult<String>;

    /// Looks up a live session, `None` when missing or expired
    async fn get(&self, session_id: &str) -> AppResult<Option<SessionUser>>;

    /// Rewrites an existing session and restarts its TTL
    async fn replace(&self, session_id: &str, user: &SessionUser) -> AppResult<()>;

    async fn destroy(&self, session_id: &str) -> AppResult<()>;

    /// Issues a single-use CSRF state for an OAuth round trip
    async fn issue_login_state(&self) -> AppResult<String>;

    /// Consumes a login state, `true` only the first time a valid state is seen
    async fn consume_login_state(&self, state: &str) -> AppResult<bool>;

    /// Session lifetime in seconds, mirrored in the cookie's Max-Age
    fn ttl_secs(&self) -> u64;
}

/// `SessionStore` backed by Redis keys with expiry
#[derive(Clone)]
pub struct RedisSessionStore {
    cache: Cache,
    ttl: u64,
}

impl RedisSessionStore {
    pub fn new(cache: Cache, ttl: u64) -> Self {
        Self { cache, ttl }
    }
}

/// Random alphanumeric token for OAuth `state`
pub fn random_login_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LOGIN_STATE_LEN)
        .map(char::from)
        .collect()
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user: &SessionUser) -> AppResult<String> {
        let session_id = Uuid::new_v4().to_string();
        self.cache
            .set(&CacheKey::Session(session_id.clone()), user, self.ttl)
            .await?;

        tracing::info!(user_id = user.id, ttl = self.ttl, "Session created");
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> AppResult<Option<SessionUser>> {
        self.cache
            .get_from_cache(&CacheKey::Session(session_id.to_string()))
            .await
    }

    async fn replace(&self, session_id: &str, user: &SessionUser) -> AppResult<()> {
        self.cache
            .set(&CacheKey::Session(session_id.to_string()), user, self.ttl)
            .await
    }

    async fn destroy(&self, session_id: &str) -> AppResult<()> {
        let existed = self
            .cache
            .delete(&CacheKey::Session(session_id.to_string()))
            .await?;
        tracing::debug!(existed, "Session destroyed");
        Ok(())
    }

    async fn issue_login_state(&self) -> AppResult<String> {
        let state = random_login_state();
        self.cache
            .set(&CacheKey::LoginState(state.clone()), &true, LOGIN_STATE_TTL)
            .await?;
        Ok(state)
    }

    async fn consume_login_state(&self, state: &str) -> AppResult<bool> {
        let found: Option<bool> = self
            .cache
            .take(&CacheKey::LoginState(state.to_string()))
            .await?;
        Ok(found.unwrap_or(false))
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl
    }
}
