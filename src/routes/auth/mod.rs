mod handler;
pub mod model;
pub mod service;

pub use handler::{health, login, logout, profile, refresh, register};
pub use service::AuthService;
