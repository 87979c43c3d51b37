// 客户端：本地会话存储、路由守卫与接口客户端

pub mod api;
pub mod guard;
pub mod session;
pub mod storage;

pub use api::{ClientError, FarmClient};
pub use guard::{DEFAULT_LANDING, GuardState, LOGIN_PATH, Navigation, RouteGuard};
pub use session::{AUTH_STORAGE_KEY, Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
