use std::io;

use serde::{Deserialize, Serialize};

use crate::models::{AuthResponse, UserProfile};

use super::storage::SessionStorage;

pub const AUTH_STORAGE_KEY: &str = "auth-storage";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserProfile,
    pub token: String,
    pub refresh_token: String,
    pub is_authenticated: bool,
}

/// 持久化外层结构 `{state: {...}, version}`
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    state: Session,
    #[serde(default)]
    version: u32,
}

/// 客户端会话存储，整条记录读写
pub struct SessionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn save(&mut self, auth: &AuthResponse) -> io::Result<()> {
        let record = PersistedSession {
            state: Session {
                user: auth.user.clone(),
                token: auth.access_token.clone(),
                refresh_token: auth.refresh_token.clone(),
                is_authenticated: true,
            },
            version: 0,
        };
        let json = serde_json::to_string(&record)?;
        self.storage.set_item(AUTH_STORAGE_KEY, &json)
    }

    /// 记录缺失或无法解析时视为无会话
    pub fn load(&self) -> Option<Session> {
        let raw = self.storage.get_item(AUTH_STORAGE_KEY)?;
        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(record) => Some(record.state),
            Err(e) => {
                tracing::debug!("Ignoring unreadable session record: {}", e);
                None
            }
        }
    }

    /// 是否存在记录，无论能否解析
    pub fn has_record(&self) -> bool {
        self.storage.get_item(AUTH_STORAGE_KEY).is_some()
    }

    pub fn clear(&mut self) -> io::Result<()> {
        self.storage.remove_item(AUTH_STORAGE_KEY)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
