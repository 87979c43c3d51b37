use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    config::Config,
    middleware::{RateLimiter, auth_middleware, log_errors, rate_limit},
};

pub mod auth;

/// 组装全部路由。限流器依赖 Redis，为 None 时不启用。
pub fn app_router(state: AppState, rate_limiter: Option<Arc<RateLimiter>>) -> Router {
    // 将路由分为公开路由和受保护路由
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/refresh", post(auth::refresh));

    let protected_routes = Router::new()
        .route("/auth/profile", get(auth::profile))
        .route("/auth/logout", post(auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new().merge(public_routes).merge(protected_routes);
    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = Router::new().route("/health", get(auth::health));
    let router = if base.is_empty() {
        router.merge(api)
    } else {
        router.nest(base, api)
    };

    let router = router.layer(axum::middleware::from_fn(log_errors));
    let router = match rate_limiter {
        Some(limiter) => router.layer(axum::middleware::from_fn_with_state(limiter, rate_limit)),
        None => router,
    };

    router
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origin.trim() == "*" {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .filter_map(|origin| {
            let origin = origin.trim();
            HeaderValue::from_str(origin)
                .map_err(|_| tracing::warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
