use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::repository::DEFAULT_STORE_TIMEOUT;

/// Which persistence backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub jwt_secret: String,
    pub server_port: u16,
    pub server_host: String,
    pub store_timeout: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let store_backend = match var("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::Unconfigured(format!(
                    "STORE_BACKEND must be `postgres` or `memory`, got `{}`",
                    other
                )))
            }
        };

        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(AppError::Unconfigured("DATABASE_URL must be set".into()));
        }

        let store_timeout = match var("STORE_TIMEOUT_SECS") {
            Some(raw) => match parse_or::<u64>(Some(raw), "STORE_TIMEOUT_SECS", 0)? {
                0 => {
                    return Err(AppError::Unconfigured(
                        "STORE_TIMEOUT_SECS must be greater than zero".into(),
                    ))
                }
                secs => Duration::from_secs(secs),
            },
            None => DEFAULT_STORE_TIMEOUT,
        };

        let jwt_secret =
            var("JWT_SECRET").ok_or_else(|| AppError::Unconfigured("JWT_SECRET not set".into()))?;

        Ok(Self {
            store_backend,
            database_url,
            database_name: var("DATABASE_NAME"),
            jwt_secret,
            server_port: parse_or(var("SERVER_PORT"), "SERVER_PORT", 8080)?,
            server_host: var("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            store_timeout,
            bcrypt_cost: parse_or(var("BCRYPT_COST"), "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Unconfigured(format!("{} must be a number", key))),
        None => Ok(default),
    }
}
