pub mod postgres;
pub mod redis;
pub mod store;

pub use self::postgres::{create_pool, run_migrations, PgRecipeStore};
pub use self::redis::{create_redis_client, Cache, CacheKey, RedisSessionStore, SessionStore};
pub use self::store::RecipeStore;
