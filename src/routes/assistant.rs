use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    models::{GenerateRequest, ParseRequest, ParsedRecipe, RecipeDraft, SafetyVerdict},
    routes::AppState,
};

/// `POST /gemini/generate`
pub async fn generate(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<Value>> {
    let prompt = request
        .prompt_text()
        .ok_or_else(|| AppError::InvalidInput("Prompt is required".to_string()))?;

    let text = state.assistant.generate(&prompt).await?;
    tracing::info!(user_id = current.user.id, chars = text.len(), "Recipe drafted");

    Ok(Json(json!({ "response": text })))
}

/// `POST /gemini/parse`
pub async fn parse(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ParseRequest>,
) -> AppResult<Json<ParsedRecipe>> {
    let text = request.response.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("Response text is required".to_string()));
    }

    let parsed = state.assistant.parse(text).await?;
    Ok(Json(parsed))
}

/// `POST /gemini/check`
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<RecipeDraft>,
) -> AppResult<Json<SafetyVerdict>> {
    let verdict = state.assistant.check(&draft).await?;
    tracing::info!(status = ?verdict.status, unsafe_parts = verdict.unsafe_parts.len(), "Recipe reviewed");
    Ok(Json(verdict))
}
