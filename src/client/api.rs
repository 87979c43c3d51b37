use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::utils::ApiResponse;

use super::guard::{Navigation, RouteGuard};
use super::storage::SessionStorage;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error {status}: {msg}")]
    Api { status: u16, code: i32, msg: String },
    #[error("session expired")]
    SessionExpired,
    #[error("session storage failed: {0}")]
    Storage(#[from] std::io::Error),
}

/// 带会话的接口客户端；每个响应状态都会交给路由守卫处理
pub struct FarmClient<S> {
    http: reqwest::Client,
    base_url: String,
    guard: RouteGuard<S>,
}

impl<S: SessionStorage> FarmClient<S> {
    pub fn new(base_url: impl Into<String>, guard: RouteGuard<S>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            guard,
        }
    }

    pub fn guard(&self) -> &RouteGuard<S> {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut RouteGuard<S> {
        &mut self.guard
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(
        &mut self,
        email_or_username: &str,
        password: &str,
    ) -> Result<Navigation, ClientError> {
        let body = LoginRequest {
            email_or_username: email_or_username.to_string(),
            password: password.to_string(),
        };
        self.authenticate("/auth/login", &body).await
    }

    pub async fn register(&mut self, req: &RegisterRequest) -> Result<Navigation, ClientError> {
        self.authenticate("/auth/register", req).await
    }

    async fn authenticate<B: Serialize>(
        &mut self,
        path: &str,
        body: &B,
    ) -> Result<Navigation, ClientError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        let auth: AuthResponse = resp.json().await?;
        Ok(self.guard.complete_login(&auth)?)
    }

    /// 访问受保护接口，自动附带 Bearer 令牌
    pub async fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ClientError> {
        let Some(session) = self.guard.authorize_request() else {
            self.guard.logout();
            return Err(ClientError::SessionExpired);
        };

        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&session.token)
            .send()
            .await?;

        if self.guard.handle_status(resp.status()).is_some() {
            return Err(ClientError::SessionExpired);
        }
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// 通知服务端后无条件清除本地会话
    pub async fn logout(&mut self) -> Navigation {
        if let Some(session) = self.guard.valid_session() {
            let result = self
                .http
                .post(self.url("/auth/logout"))
                .bearer_auth(&session.token)
                .send()
                .await;
            if let Err(e) = result {
                tracing::debug!("Logout notification failed: {}", e);
            }
        }
        self.guard.logout()
    }
}

async fn api_error(resp: Response) -> ClientError {
    let status = resp.status();
    match resp.json::<ApiResponse<()>>().await {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            code: body.code,
            msg: body.msg,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            code: 0,
            msg: status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
        },
    }
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => StatusCode::from_u16(*status).ok(),
            ClientError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}
