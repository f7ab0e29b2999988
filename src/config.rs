// src/config.rs

use std::{env, fmt, net::SocketAddr, str::FromStr};

use dotenvy::dotenv;

/// What happens when a user submits a quiz they already have history for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetakePolicy {
    /// Every submission is a new history record and counts again.
    #[default]
    Allow,
    /// Only the first submission per (user, quiz) is kept; later ones get 409.
    FirstOnly,
}

impl FromStr for RetakePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(RetakePolicy::Allow),
            "first-only" | "first_only" => Ok(RetakePolicy::FirstOnly),
            other => Err(ConfigError::Invalid("RETAKE_POLICY", other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "{} must be set", var),
            ConfigError::Invalid(var, value) => write!(f, "{} has an invalid value '{}'", var, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without it the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub retake_policy: RetakePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let bind_addr = match lookup("BIND_ADDR") {
            Some(addr) => addr
                .parse()
                .map_err(|_| ConfigError::Invalid("BIND_ADDR", addr))?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let retake_policy = match lookup("RETAKE_POLICY") {
            Some(policy) => policy.parse()?,
            None => RetakePolicy::default(),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            retake_policy,
        })
    }
}
