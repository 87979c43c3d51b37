use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::Claims,
    error::AppError,
    models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair, UserProfile},
    utils::AppJson,
};

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let resp = state.auth.login(req).await?;
    Ok(Json(resp))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let resp = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(req): AppJson<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(pair))
}

/// 当前登录用户信息
#[axum::debug_handler]
pub async fn profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.auth.profile(claims.sub).await?;
    Ok(Json(profile))
}

/// 令牌无状态，服务端仅确认，由客户端清除会话
#[axum::debug_handler]
pub async fn logout(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    tracing::info!(user_id = %claims.sub, "user logged out");
    StatusCode::NO_CONTENT
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
