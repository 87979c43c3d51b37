use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::AppError};

/// 校验 `Authorization: Bearer <accessToken>`，通过后把 Claims 放入请求扩展。
/// 刷新令牌不能直接访问受保护资源。
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state)
            .await
            .map_err(|_| {
                tracing::debug!(path = %parts.uri.path(), "missing bearer token");
                AppError::Unauthorized
            })?;

    let claims = state.auth.tokens().verify_access(bearer.token())?;

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
