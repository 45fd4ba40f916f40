/// Read-through caching against Redis.
///
/// Returns the cached value when `$key` is present. Otherwise awaits
/// `$block`, hands the result to the background writer with `$ttl` seconds
/// of expiry, and returns it. Errors from the cache read or from `$block`
/// are propagated with `?`.
///
/// # Arguments
/// * `$cache`: anything exposing `get_from_cache` and `set_in_background`.
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: expiry in seconds.
/// * `$block`: a future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let videos: Vec<Video> = cached!(
///     self.cache,
///     CacheKey::VideoSearch(keyword.to_string()),
///     VIDEO_CACHE_TTL,
///     async move { self.fetch(keyword).await }
/// )?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            tracing::debug!(key = %$key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
