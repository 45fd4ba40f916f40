use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::VideoSearchRequest,
    routes::AppState,
};

/// Multipart field holding the uploaded image
const IMAGE_FIELD: &str = "image";

/// `POST /youtube/search`
pub async fn search_videos(
    State(state): State<Arc<AppState>>,
    _current: CurrentUser,
    Json(request): Json<VideoSearchRequest>,
) -> AppResult<Json<Value>> {
    let keyword = request.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::InvalidInput("Keyword is required".to_string()));
    }

    let videos = state.videos.search_videos(keyword).await?;
    Ok(Json(json!({ "videos": videos })))
}

/// `POST /api/imgur/upload`
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Malformed upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Image file is empty".to_string()));
        }

        let link = state.images.upload(&file_name, bytes.to_vec()).await?;
        return Ok(Json(json!({ "link": link })));
    }

    Err(AppError::InvalidInput("No image file provided".to_string()))
}
