use std::sync::Arc;

use crate::{
    config::Config,
    db::{RecipeStore, SessionStore},
    services::providers::{IdentityProvider, ImageHost, RecipeAssistant, VideoSearch},
};

/// Settings handlers need at request time
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where the browser lands after login
    pub frontend_url: String,
    pub cookie_secure: bool,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            cookie_secure: config.cookie_secure,
        }
    }
}

/// Shared application state
///
/// Every backend is a trait object so the router can be driven against
/// in-memory implementations.
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub assistant: Arc<dyn RecipeAssistant>,
    pub videos: Arc<dyn VideoSearch>,
    pub images: Arc<dyn ImageHost>,
    pub settings: Settings,
}
