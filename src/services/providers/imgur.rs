/// Anonymous image uploads to Imgur
use reqwest::{
    multipart::{Form, Part},
    Client as HttpClient,
};

use crate::{
    error::{AppError, AppResult},
    models::ImgurResponse,
    services::providers::{ensure_success, ImageHost},
};

#[derive(Clone)]
pub struct ImgurHost {
    http_client: HttpClient,
    client_id: String,
    api_url: String,
}

impl ImgurHost {
    pub fn new(client_id: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            client_id,
            api_url,
        }
    }
}

#[async_trait::async_trait]
impl ImageHost for ImgurHost {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        let size = bytes.len();
        let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .http_client
            .post(format!("{}/3/image", self.api_url.trim_end_matches('/')))
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await?;

        let body: ImgurResponse = ensure_success("Imgur", response).await?.json().await?;
        let link = body
            .data
            .link
            .filter(|_| body.success)
            .ok_or_else(|| AppError::ExternalApi("Imgur upload returned no link".to_string()))?;

        tracing::info!(bytes = size, provider = "imgur", "Image uploaded");
        Ok(link)
    }
}
