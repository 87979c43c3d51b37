use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::{RepoError, UserEntity, UserRepository};

/// 内存用户存储库，用于测试与本地开发。
/// 与 Postgres 的唯一约束一致：邮箱与用户名在所有记录（含软删除）中唯一。
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<Uuid, UserEntity>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, UserEntity>>, RepoError> {
        self.users
            .lock()
            .map_err(|_| RepoError::Store("user store lock poisoned".into()))
    }

    /// 直接修改记录，模拟管理员操作（停用、软删除等）
    pub fn update<F>(&self, id: Uuid, f: F) -> Result<bool, RepoError>
    where
        F: FnOnce(&mut UserEntity),
    {
        let mut users = self.lock()?;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                f(user);
                true
            }
            None => false,
        })
    }

    pub fn len(&self) -> usize {
        self.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email_or_username(
        &self,
        email_or_username: &str,
    ) -> Result<Option<UserEntity>, RepoError> {
        let email = email_or_username.to_lowercase();
        let users = self.lock()?;
        Ok(users
            .values()
            .find(|u| !u.is_deleted() && (u.email == email || u.username == email_or_username))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, RepoError> {
        let users = self.lock()?;
        Ok(users.get(&id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        let email = email.to_lowercase();
        Ok(self.lock()?.values().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepoError> {
        Ok(self.lock()?.values().any(|u| u.username == username))
    }

    async fn insert(&self, user: &UserEntity) -> Result<(), RepoError> {
        let mut users = self.lock()?;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::DuplicateEmail);
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(RepoError::DuplicateUsername);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        self.update(id, |user| {
            user.last_login_at = Some(at);
            user.updated_at = at;
        })?;
        Ok(())
    }
}
