// Configuration layer - environment-driven settings
pub mod logging;

pub use logging::{init_logging, LoggingError};

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Application settings, loaded from the environment (a `.env` file is read
/// first when present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub reset_token_secret: String,
    pub password_pepper: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://staffhub.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?;
        let reset_token_secret = env::var("RESET_TOKEN_SECRET")
            .map_err(|_| ConfigError::MissingVar("RESET_TOKEN_SECRET"))?;
        let password_pepper = env::var("PASSWORD_PEPPER")
            .map_err(|_| ConfigError::MissingVar("PASSWORD_PEPPER"))?;

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            reset_token_secret,
            password_pepper,
        })
    }
}
