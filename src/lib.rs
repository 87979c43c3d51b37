use std::sync::Arc;

use auth::TokenIssuer;
use config::Config;
use database::UserRepository;
use routes::auth::AuthService;

pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod utils;

#[cfg(test)]
mod testing;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config, users: Arc<dyn UserRepository>) -> Self {
        let tokens = Arc::new(TokenIssuer::from_config(&config));
        let auth = AuthService::new(users, tokens, config.bcrypt_cost);
        Self { config, auth }
    }
}
