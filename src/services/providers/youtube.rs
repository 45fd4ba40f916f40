/// YouTube Data API v3 video search
///
/// Results are cached per normalized keyword so repeated lookups for the same
/// dish do not spend API quota.
use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Video, YoutubeSearchResponse},
    services::providers::{ensure_success, VideoSearch},
};

const VIDEO_CACHE_TTL: u64 = 3600; // 1 hour
const MAX_RESULTS: usize = 5;

#[derive(Clone)]
pub struct YoutubeSearch {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl YoutubeSearch {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    async fn fetch(&self, keyword: &str) -> AppResult<Vec<Video>> {
        let url = format!("{}/youtube/v3/search", self.api_url.trim_end_matches('/'));
        let max_results = MAX_RESULTS.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", max_results.as_str()),
                ("q", keyword),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body: YoutubeSearchResponse = ensure_success("YouTube", response).await?.json().await?;
        let mut videos = body.into_videos();
        videos.truncate(MAX_RESULTS);

        tracing::info!(keyword, results = videos.len(), provider = "youtube", "Videos fetched");
        Ok(videos)
    }
}

#[async_trait::async_trait]
impl VideoSearch for YoutubeSearch {
    async fn search_videos(&self, keyword: &str) -> AppResult<Vec<Video>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::InvalidInput("Keyword is required".to_string()));
        }

        cached!(
            self.cache,
            CacheKey::VideoSearch(keyword.to_string()),
            VIDEO_CACHE_TTL,
            self.fetch(keyword)
        )
    }
}
