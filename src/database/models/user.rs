use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{UserProfile, UserRole};

/// 用户实体，对应数据库中的 users 表
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    /// 用户ID
    pub id: Uuid,
    /// 邮箱（唯一）
    pub email: String,
    /// 用户名（唯一）
    pub username: String,
    /// bcrypt 密码哈希
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// 角色
    pub role: UserRole,
    /// 是否启用
    pub is_active: bool,
    /// 最后登录时间
    pub last_login_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserEntity {
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
            is_active: self.is_active,
            last_login_at: self.last_login_at,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
