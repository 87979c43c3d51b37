use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::database::UserEntity;
use crate::models::UserRole;

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/farm_test".into(),
        redis_url: "redis://localhost".into(),
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/api".into(),
        jwt_secret: "access-secret-for-tests".into(),
        jwt_expiration_secs: 7 * 86_400,
        jwt_refresh_secret: "refresh-secret-for-tests".into(),
        jwt_refresh_expiration_secs: 30 * 86_400,
        cors_origin: "*".into(),
        rate_limit_window_secs: 60,
        rate_limit_requests: 100,
        bcrypt_cost: 4,
    }
}

pub fn sample_user(email: &str, username: &str) -> UserEntity {
    let now = Utc::now();
    UserEntity {
        id: Uuid::new_v4(),
        email: email.to_string(),
        username: username.to_string(),
        password_hash: String::new(),
        first_name: "Test".into(),
        last_name: "Farmer".into(),
        role: UserRole::Worker,
        is_active: true,
        last_login_at: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}
