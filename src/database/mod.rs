// 数据库模块
// 用户实体定义与存储库接口，Postgres 与内存两种实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod models;
pub mod repositories;

pub use models::user::UserEntity;
pub use repositories::memory::MemoryUserRepository;
pub use repositories::user::PgUserRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already exists")]
    DuplicateEmail,
    #[error("username already exists")]
    DuplicateUsername,
    #[error("store failure: {0}")]
    Store(String),
}

/// 用户存储库接口。唯一性由存储层保证，冲突以 Duplicate* 返回。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 按邮箱或用户名查找未删除的用户
    async fn find_by_email_or_username(
        &self,
        email_or_username: &str,
    ) -> Result<Option<UserEntity>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, RepoError>;

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError>;

    async fn username_exists(&self, username: &str) -> Result<bool, RepoError>;

    /// 插入完整的用户记录
    async fn insert(&self, user: &UserEntity) -> Result<(), RepoError>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;
}
