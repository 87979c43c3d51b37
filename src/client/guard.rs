//! 客户端路由守卫
//!
//! 每次渲染受保护页面都会重新校验本地会话，而不只在登录时校验一次；
//! 会话被篡改或服务端返回 401 时清空存储并跳转登录页。

use std::io;

use reqwest::StatusCode;

use crate::auth::peek_access_claims;
use crate::models::AuthResponse;

use super::session::{Session, SessionStore};
use super::storage::SessionStorage;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DEFAULT_LANDING: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    Authenticated,
    Redirecting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(String),
    Redirect(String),
}

impl Navigation {
    pub fn path(&self) -> &str {
        match self {
            Navigation::Render(path) | Navigation::Redirect(path) => path,
        }
    }
}

pub struct RouteGuard<S> {
    store: SessionStore<S>,
    state: GuardState,
    return_to: Option<String>,
}

impl<S: SessionStorage> RouteGuard<S> {
    pub fn new(store: SessionStore<S>) -> Self {
        let mut guard = Self {
            store,
            state: GuardState::Unauthenticated,
            return_to: None,
        };
        if guard.valid_session().is_some() {
            guard.state = GuardState::Authenticated;
        }
        guard
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    /// 当前可用的会话：记录存在、标记为已认证、访问令牌结构有效且未过期
    pub fn valid_session(&self) -> Option<Session> {
        let session = self.store.load()?;
        if !session.is_authenticated {
            return None;
        }
        match peek_access_claims(&session.token) {
            Ok(_) => Some(session),
            Err(e) => {
                tracing::debug!("Stored session rejected: {}", e);
                None
            }
        }
    }

    /// 发起受保护请求前取会话。存储中可能是其他实例写入的会话，有效即视为已认证
    pub fn authorize_request(&mut self) -> Option<Session> {
        let session = self.valid_session()?;
        self.state = GuardState::Authenticated;
        Some(session)
    }

    pub fn navigate(&mut self, path: &str) -> Navigation {
        let route = route_of(path);

        if is_public(route) {
            if route == LOGIN_PATH && self.valid_session().is_some() {
                self.state = GuardState::Authenticated;
                return Navigation::Redirect(DEFAULT_LANDING.to_string());
            }
            return Navigation::Render(path.to_string());
        }

        if self.valid_session().is_some() {
            self.state = GuardState::Authenticated;
            return Navigation::Render(path.to_string());
        }

        // 记录存在但已失效（过期或被篡改），一并清除
        if self.store.has_record() {
            self.clear_store();
        }
        tracing::debug!(path, "redirecting unauthenticated navigation to login");
        self.state = GuardState::Redirecting;
        self.return_to = Some(path.to_string());
        Navigation::Redirect(LOGIN_PATH.to_string())
    }

    /// 登录或注册成功后保存会话，并回到之前请求的页面
    pub fn complete_login(&mut self, auth: &AuthResponse) -> io::Result<Navigation> {
        self.store.save(auth)?;
        self.state = GuardState::Authenticated;
        let target = self
            .return_to
            .take()
            .unwrap_or_else(|| DEFAULT_LANDING.to_string());
        Ok(Navigation::Redirect(target))
    }

    /// 处理接口响应状态；已认证状态下收到 401 时强制登出
    pub fn handle_status(&mut self, status: StatusCode) -> Option<Navigation> {
        if status != StatusCode::UNAUTHORIZED || self.state != GuardState::Authenticated {
            return None;
        }
        tracing::info!("API rejected session token, forcing logout");
        self.clear_store();
        self.state = GuardState::Unauthenticated;
        Some(Navigation::Redirect(LOGIN_PATH.to_string()))
    }

    pub fn logout(&mut self) -> Navigation {
        self.clear_store();
        self.state = GuardState::Unauthenticated;
        self.return_to = None;
        Navigation::Redirect(LOGIN_PATH.to_string())
    }

    fn clear_store(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear session store: {}", e);
        }
    }
}

fn route_of(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn is_public(route: &str) -> bool {
    matches!(route, LOGIN_PATH | REGISTER_PATH)
}
