#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use daily_farm_backend::{
    AppState, config::Config, database::MemoryUserRepository, models::RegisterRequest, routes,
};
use serde_json::Value;
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/farm_test".into(),
        redis_url: "redis://localhost".into(),
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/api".into(),
        jwt_secret: "integration-access-secret".into(),
        jwt_expiration_secs: 7 * 86_400,
        jwt_refresh_secret: "integration-refresh-secret".into(),
        jwt_refresh_expiration_secs: 30 * 86_400,
        cors_origin: "*".into(),
        rate_limit_window_secs: 60,
        rate_limit_requests: 100,
        bcrypt_cost: 4,
    }
}

pub fn test_app() -> (Router, AppState, Arc<MemoryUserRepository>) {
    let repo = Arc::new(MemoryUserRepository::new());
    let state = AppState::new(test_config(), repo.clone());
    (routes::app_router(state.clone(), None), state, repo)
}

pub fn registration(email: &str, username: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.into(),
        username: username.into(),
        password: "pasture-2024".into(),
        first_name: "Rosie".into(),
        last_name: "Guernsey".into(),
    }
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// 在随机端口上启动服务，返回基础地址
pub async fn spawn_server() -> (String, Arc<MemoryUserRepository>) {
    let (app, _, repo) = test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), repo)
}
