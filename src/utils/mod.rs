use axum::{Json, extract::FromRequest};
use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 错误响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

/// JSON 请求体提取器，解析失败时返回 400 和统一错误体
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const DUPLICATE_EMAIL: i32 = 1001;
    pub const DUPLICATE_USERNAME: i32 = 1002;
    pub const INVALID_CREDENTIALS: i32 = 1003;
    pub const ACCOUNT_INACTIVE: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const UNAUTHORIZED: i32 = 1006;
    pub const TOKEN_EXPIRED: i32 = 1007;
    pub const TOKEN_MALFORMED: i32 = 1008;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5003;
}
