use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::auth::TokenError;
use crate::database::RepoError;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is inactive")]
    AccountInactive,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("username already taken")]
    DuplicateUsername,
    #[error("token expired")]
    TokenExpired,
    #[error("token malformed")]
    TokenMalformed,
    #[error("unauthorized")]
    Unauthorized,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("too many requests, retry in {0} seconds")]
    RateLimited(u64),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::TokenExpired
            | AppError::TokenMalformed
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::AccountInactive => StatusCode::FORBIDDEN,
            AppError::DuplicateEmail | AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            AppError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AppError::AccountInactive => error_codes::ACCOUNT_INACTIVE,
            AppError::DuplicateEmail => error_codes::DUPLICATE_EMAIL,
            AppError::DuplicateUsername => error_codes::DUPLICATE_USERNAME,
            AppError::TokenExpired => error_codes::TOKEN_EXPIRED,
            AppError::TokenMalformed => error_codes::TOKEN_MALFORMED,
            AppError::Unauthorized => error_codes::UNAUTHORIZED,
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::RateLimited(_) => error_codes::RATE_LIMIT,
            AppError::ServiceUnavailable(_) => error_codes::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// 对外返回的消息，存储层和内部错误的细节只写日志
    pub fn public_message(&self) -> String {
        match self {
            AppError::ServiceUnavailable(_) => "Service temporarily unavailable".into(),
            AppError::Internal(_) => "Internal server error".into(),
            AppError::InvalidCredentials => "Invalid credentials".into(),
            AppError::AccountInactive => "Account is inactive".into(),
            AppError::DuplicateEmail => "Email is already registered".into(),
            AppError::DuplicateUsername => "Username is already taken".into(),
            AppError::TokenExpired => "Token has expired".into(),
            AppError::TokenMalformed | AppError::Unauthorized => "Unauthorized".into(),
            other => other.to_string(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Malformed => AppError::TokenMalformed,
            TokenError::Encode(e) => AppError::Internal(format!("token encoding failed: {e}")),
            TokenError::Lifetime => AppError::Internal("token lifetime out of range".into()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateEmail => AppError::DuplicateEmail,
            RepoError::DuplicateUsername => AppError::DuplicateUsername,
            RepoError::Store(e) => AppError::ServiceUnavailable(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::ServiceUnavailable(detail) | AppError::Internal(detail) => {
                tracing::error!(code = self.code(), "{}", detail);
            }
            _ => tracing::debug!(code = self.code(), "request rejected: {}", self),
        }
        (
            status,
            error_to_api_response::<()>(self.code(), self.public_message()),
        )
            .into_response()
    }
}
