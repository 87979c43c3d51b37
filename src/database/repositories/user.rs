use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{RepoError, UserEntity, UserRepository};

const USER_COLUMNS: &str = r#"
    id, email, username, password_hash, first_name, last_name,
    role, is_active, last_login_at, created_at, updated_at, deleted_at
"#;

const EMAIL_UNIQUE: &str = "users_email_key";
const USERNAME_UNIQUE: &str = "users_username_key";

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some(EMAIL_UNIQUE) => return RepoError::DuplicateEmail,
                    Some(USERNAME_UNIQUE) => return RepoError::DuplicateUsername,
                    _ => {}
                }
            }
        }
        RepoError::Store(err.to_string())
    }
}

/// Postgres 用户存储库
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email_or_username(
        &self,
        email_or_username: &str,
    ) -> Result<Option<UserEntity>, RepoError> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE (email = lower($1) OR username = $1)
              AND deleted_at IS NULL
            LIMIT 1
            "#
        ))
        .bind(email_or_username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, RepoError> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        // 软删除的用户仍占用唯一约束
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = lower($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepoError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert(&self, user: &UserEntity) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                id, email, username, password_hash, first_name, last_name,
                role, is_active, last_login_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!("Created user: {}", user.id);
                Ok(())
            }
            Err(e) => {
                let err = RepoError::from(e);
                if matches!(err, RepoError::Store(_)) {
                    tracing::error!("Failed to create user: {:?}", err);
                }
                Err(err)
            }
        }
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        sqlx::query("UPDATE users SET last_login_at = $1, updated_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
