use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    middleware::session::{expired_session_cookie, session_cookie, session_id_from},
    models::{AuthorizeParams, SessionUser},
    routes::AppState,
};

/// Starts the OAuth round trip
pub async fn login(State(state): State<Arc<AppState>>) -> AppResult<Redirect> {
    let login_state = state.sessions.issue_login_state().await?;
    Ok(Redirect::to(&state.identity.authorize_url(&login_state)))
}

/// OAuth callback: verifies `state`, resolves the identity and opens a session
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthorizeParams>,
) -> AppResult<Response> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Login denied by identity provider");
        return Err(AppError::InvalidInput(format!("Login failed: {}", error)));
    }

    let login_state = params
        .state
        .ok_or_else(|| AppError::InvalidInput("Missing state parameter".to_string()))?;
    if !state.sessions.consume_login_state(&login_state).await? {
        return Err(AppError::InvalidInput(
            "Invalid or expired state parameter".to_string(),
        ));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    let identity = state.identity.exchange_code(&code).await?;
    let user = state.store.upsert_user(&identity).await?;
    let session_id = state.sessions.create(&SessionUser::from(&user)).await?;

    tracing::info!(user_id = user.id, "User logged in");

    let cookie = session_cookie(
        &session_id,
        state.sessions.ttl_secs(),
        state.settings.cookie_secure,
    );
    let target = format!("{}/dashboard", state.settings.frontend_url);

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response())
}

/// Reports whether the caller holds a live session
pub async fn check(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AppResult<Response> {
    let user = match session_id_from(&headers) {
        Some(session_id) => state.sessions.get(&session_id).await?,
        None => None,
    };

    let response = match user {
        Some(user) => Json(json!({ "valid": true, "user": user })).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "error": "Session expired or invalid" })),
        )
            .into_response(),
    };

    Ok(response)
}

/// Destroys the session record and expires the cookie
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(session_id) = session_id_from(&headers) {
        state.sessions.destroy(&session_id).await?;
        tracing::info!("User logged out");
    }

    let cookie = expired_session_cookie(state.settings.cookie_secure);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response())
}
