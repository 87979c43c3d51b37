pub mod user;

pub use user::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair, UserProfile, UserRole,
};
