/// Third-party service abstraction
///
/// Each external API the backend talks to sits behind a trait so handlers
/// depend on the capability, not the vendor. The HTTP implementations live in
/// the submodules; tests swap in in-memory fakes.
use crate::{
    error::{AppError, AppResult},
    models::{Identity, ParsedRecipe, RecipeDraft, SafetyVerdict, Video},
};

pub mod gemini;
pub mod google;
pub mod imgur;
pub mod youtube;

pub use gemini::GeminiAssistant;
pub use google::GoogleIdentity;
pub use imgur::ImgurHost;
pub use youtube::YoutubeSearch;

/// OAuth identity provider
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to in order to log in
    fn authorize_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for the user's identity
    async fn exchange_code(&self, code: &str) -> AppResult<Identity>;
}

/// Generative model used to draft, structure and review recipes
#[async_trait::async_trait]
pub trait RecipeAssistant: Send + Sync {
    /// Drafts a recipe as free text from a user prompt
    async fn generate(&self, prompt: &str) -> AppResult<String>;

    /// Turns free-text recipe output into structured fields
    async fn parse(&self, text: &str) -> AppResult<ParsedRecipe>;

    /// Reviews a recipe draft for unsafe ingredients or steps
    async fn check(&self, draft: &RecipeDraft) -> AppResult<SafetyVerdict>;
}

#[async_trait::async_trait]
pub trait VideoSearch: Send + Sync {
    /// At most five videos matching `keyword`
    async fn search_videos(&self, keyword: &str) -> AppResult<Vec<Video>>;
}

#[async_trait::async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads an image and returns its public link
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String>;
}

/// Passes successful responses through, turning anything else into `ExternalApi`
///
/// The upstream status and body are logged; the error message carries only the
/// provider name so nothing vendor-specific reaches the client.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(provider, status = %status, body = %body, "Upstream request failed");

    Err(AppError::ExternalApi(format!(
        "{} API returned status {}",
        provider, status
    )))
}
