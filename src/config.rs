use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub busy_timeout: Duration,
    pub seed_file: Option<PathBuf>,
    pub cors_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://learn_wa.db".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_connections: 5,
            busy_timeout: Duration::from_millis(5000),
            seed_file: None,
            cors_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|_| AppError::Config(format!("BIND_ADDR is not a socket address: {}", addr)))?;
        }
        if let Some(max) = lookup("DB_MAX_CONNECTIONS") {
            config.max_connections = max
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::Config(format!("DB_MAX_CONNECTIONS must be a positive integer: {}", max)))?;
        }
        if let Some(ms) = lookup("DB_BUSY_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .map_err(|_| AppError::Config(format!("DB_BUSY_TIMEOUT_MS must be an integer: {}", ms)))?;
            config.busy_timeout = Duration::from_millis(ms);
        }
        config.seed_file = lookup("SEED_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }
}
