/// Google OAuth2 identity provider
///
/// Flow:
/// 1. Browser is sent to the authorize URL with our CSRF `state`
/// 2. Google redirects back with `code`, exchanged at the token endpoint
/// 3. The access token is used once against the userinfo endpoint
use reqwest::{Client as HttpClient, Url};

use crate::{
    error::AppResult,
    models::{Identity, TokenResponse},
    services::providers::{ensure_success, IdentityProvider},
};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SCOPE: &str = "openid profile email";

#[derive(Clone)]
pub struct GoogleIdentity {
    http_client: HttpClient,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleIdentity {
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            client_id,
            client_secret,
            redirect_url,
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoogleIdentity {
    fn authorize_url(&self, state: &str) -> String {
        let params = [
            ("response_type", "code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("scope", SCOPE),
            ("state", state),
        ];

        match Url::parse_with_params(AUTHORIZE_URL, &params) {
            Ok(url) => url.into(),
            // AUTHORIZE_URL is a constant absolute URL
            Err(_) => AUTHORIZE_URL.to_string(),
        }
    }

    async fn exchange_code(&self, code: &str) -> AppResult<Identity> {
        let response = self
            .http_client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
            ])
            .send()
            .await?;
        let token: TokenResponse = ensure_success("Google token", response).await?.json().await?;

        let response = self
            .http_client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        let identity: Identity = ensure_success("Google userinfo", response).await?.json().await?;

        tracing::info!(email = %identity.email, provider = "google", "Identity resolved");
        Ok(identity)
    }
}
