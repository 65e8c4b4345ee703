//! Runtime configuration read from the environment (and `.env`, if present)

use axum_extra::extract::cookie::Key;
use std::env;
use thiserror::Error;

use crate::error::AppError;
use crate::password::PasswordHasher;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("SESSION_SECRET must be at least 64 bytes, got {0}")]
    SessionSecretTooShort(usize),

    #[error("invalid password hashing parameters: {0}")]
    Hashing(#[from] AppError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// redb file path; `None` keeps everything in memory
    pub database_path: Option<String>,
    pub session_secret: Option<String>,
    pub argon2_memory_kib: Option<u32>,
    pub argon2_iterations: Option<u32>,
    pub log_filter: String,
}

impl Config {
    /// Reads the configuration
    ///
    /// # Environment Variables
    ///
    /// - `HOST` - Bind address (default: 0.0.0.0)
    /// - `PORT` - Server port number (default: 8080)
    /// - `DATABASE_URL` - Path to a database file (default: in-memory)
    /// - `SESSION_SECRET` - Cookie signing key material, 64+ bytes (default: random per process)
    /// - `ARGON2_MEMORY_KIB`, `ARGON2_ITERATIONS` - Password hashing cost
    /// - `RUST_LOG` - Tracing filter (default: "tinyapp=debug,tower_http=debug")
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT")?.unwrap_or(8080);

        let database_path = non_empty_var("DATABASE_URL");
        let session_secret = non_empty_var("SESSION_SECRET");

        let log_filter = env::var("RUST_LOG")
            .unwrap_or_else(|_| "tinyapp=debug,tower_http=debug".to_string());

        Ok(Self {
            host,
            port,
            database_path,
            session_secret,
            argon2_memory_kib: parse_var("ARGON2_MEMORY_KIB")?,
            argon2_iterations: parse_var("ARGON2_ITERATIONS")?,
            log_filter,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Derives the cookie signing key
    ///
    /// Without `SESSION_SECRET` a random key is generated, so sessions do not
    /// survive a restart.
    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        match &self.session_secret {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|_| ConfigError::SessionSecretTooShort(secret.len())),
            None => {
                tracing::warn!("SESSION_SECRET not set, generating a random cookie key");
                Ok(Key::generate())
            }
        }
    }

    pub fn password_hasher(&self) -> Result<PasswordHasher, ConfigError> {
        match (self.argon2_memory_kib, self.argon2_iterations) {
            (None, None) => Ok(PasswordHasher::new()),
            (memory, iterations) => Ok(PasswordHasher::with_cost(
                memory.unwrap_or(argon2::Params::DEFAULT_M_COST),
                iterations.unwrap_or(argon2::Params::DEFAULT_T_COST),
            )?),
        }
    }
}

fn non_empty_var(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(var) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(None),
    }
}
