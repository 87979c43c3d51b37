use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::TokenIssuer;
use crate::database::{UserEntity, UserRepository};
use crate::error::AppError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, TokenPair, UserProfile, UserRole};
use crate::utils::{hash_password, verify_password};

use super::model::{validate_login, validate_registration};

/// 登录、注册、刷新令牌的业务编排
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenIssuer>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenIssuer>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        validate_login(&req)?;
        let identifier = req.email_or_username.trim();

        // 用户不存在与密码错误返回相同错误
        let Some(mut user) = self.users.find_by_email_or_username(identifier).await? else {
            tracing::info!("login failed: unknown identifier");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(&req.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::info!(user_id = %user.id, "login refused: account inactive");
            return Err(AppError::AccountInactive);
        }

        let tokens = self.tokens.issue(&user)?;

        let now = Utc::now();
        self.users.record_login(user.id, now).await?;
        user.last_login_at = Some(now);

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse::new(user.to_profile(), tokens))
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let reg = validate_registration(req)?;

        if self.users.email_exists(&reg.email).await? {
            return Err(AppError::DuplicateEmail);
        }
        if self.users.username_exists(&reg.username).await? {
            return Err(AppError::DuplicateUsername);
        }

        let now = Utc::now();
        let user = UserEntity {
            id: Uuid::new_v4(),
            email: reg.email,
            username: reg.username,
            password_hash: hash_password(&reg.password, self.bcrypt_cost)?,
            first_name: reg.first_name,
            last_name: reg.last_name,
            role: UserRole::default(),
            is_active: true,
            last_login_at: Some(now),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        // 先签发令牌再写库：签发失败不会留下半成品用户
        let tokens = self.tokens.issue_at(&user, now)?;
        // 并发注册由唯一约束兜底
        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(AuthResponse::new(user.to_profile(), tokens))
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        Ok(self.tokens.issue(&user)?)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.to_profile())
            .ok_or(AppError::Unauthorized)
    }
}
