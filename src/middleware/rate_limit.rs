use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;

use crate::{config::Config, error::AppError};

/// 基于 Redis 的固定窗口限流器，按客户端 IP 计数
#[derive(Clone)]
pub struct RateLimiter {
    redis: Arc<redis::Client>,
    window_secs: u64,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(redis: redis::Client, config: &Config) -> Self {
        Self {
            redis: Arc::new(redis),
            window_secs: config.rate_limit_window().as_secs(),
            max_requests: config.rate_limit_requests,
        }
    }

    pub async fn check_rate_limit(&self, req: Request<Body>, next: Next) -> Result<Response, AppError> {
        let ip = client_ip(&req);
        let key = format!("rate_limit:{}", ip);

        let unavailable = |e: redis::RedisError| AppError::ServiceUnavailable(format!("redis: {e}"));
        let mut conn = self
            .redis
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;

        // INCR + EXPIRE 实现计数器
        let count: u32 = conn.incr(&key, 1).await.map_err(unavailable)?;
        let decision = window_decision(count, self.max_requests);
        if decision.starts_window {
            let ttl = i64::try_from(self.window_secs).unwrap_or(i64::MAX);
            let _: () = conn.expire(&key, ttl).await.map_err(unavailable)?;
        }

        if decision.limited {
            tracing::warn!(%ip, count, "rate limit exceeded");
            return Err(AppError::RateLimited(self.window_secs));
        }

        Ok(next.run(req).await)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowDecision {
    starts_window: bool, // 首次计数，需要设置过期时间
    limited: bool,
}

/// 根据窗口内的计数判断是否限流：第 max 次仍放行，之后返回 429
fn window_decision(count: u32, max_requests: u32) -> WindowDecision {
    WindowDecision {
        starts_window: count == 1,
        limited: count > max_requests,
    }
}

/// 优先取 x-real-ip，其次 x-forwarded-for 的第一个非空地址，最后降级为连接地址
pub fn client_ip<B>(req: &Request<B>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .filter(|ip| !ip.trim().is_empty())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    limiter.check_rate_limit(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_up_to_the_limit_pass() {
        for count in 1..=100 {
            assert!(!window_decision(count, 100).limited, "count {count}");
        }
        assert!(window_decision(101, 100).limited);
        assert!(window_decision(u32::MAX, 100).limited);
    }

    #[test]
    fn only_first_request_starts_the_window() {
        assert_eq!(
            window_decision(1, 100),
            WindowDecision {
                starts_window: true,
                limited: false
            }
        );
        assert!(!window_decision(2, 100).starts_window);
        assert!(!window_decision(101, 100).starts_window);
    }

    #[test]
    fn zero_limit_rejects_everything() {
        assert_eq!(
            window_decision(1, 0),
            WindowDecision {
                starts_window: true,
                limited: true
            }
        );
    }

    #[test]
    fn prefers_real_ip_header() {
        let req = Request::builder()
            .header("x-real-ip", "10.0.0.7")
            .header("x-forwarded-for", "192.168.1.1")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), "10.0.0.7");
    }

    #[test]
    fn falls_back_to_first_forwarded_address() {
        let req = Request::builder()
            .header("x-forwarded-for", " , 203.0.113.9, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn uses_connection_address_last() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        assert_eq!(client_ip(&req), "127.0.0.1");

        let bare = Request::builder().body(()).unwrap();
        assert_eq!(client_ip(&bare), "unknown");
    }
}
