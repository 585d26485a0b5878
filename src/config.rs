/*
 * Responsibility
 * - 環境変数や設定の読み込み (JWT secret / TTL, DATABASE_URL, HTTP limits など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動後は read-only
 */
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::services::auth::token_service::MAX_TTL_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_JWT_EXPIRATION_SECONDS: u64 = 3600;
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_HTTP_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // HS256 signing secret (raw bytes of the string)
    pub jwt_secret: String,
    pub jwt_ttl: Duration,

    // Identity lookup falls back to an in-memory store when unset
    pub database_url: Option<String>,

    pub http_timeout: Duration,
    pub http_body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret or credentials in the database url
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("http_timeout", &self.http_timeout)
            .field("http_body_limit_bytes", &self.http_body_limit_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (the process env in production).
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match var("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(var("APP_ENV"));

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let jwt_ttl_seconds = positive_u64(
            var("JWT_EXPIRATION_SECONDS"),
            DEFAULT_JWT_EXPIRATION_SECONDS,
            "JWT_EXPIRATION_SECONDS",
        )?;
        if jwt_ttl_seconds > MAX_TTL_SECONDS {
            return Err(ConfigError::Invalid("JWT_EXPIRATION_SECONDS"));
        }

        let database_url = var("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let http_timeout_seconds = positive_u64(
            var("HTTP_TIMEOUT_SECONDS"),
            DEFAULT_HTTP_TIMEOUT_SECONDS,
            "HTTP_TIMEOUT_SECONDS",
        )?;

        let http_body_limit_bytes = match var("HTTP_BODY_LIMIT_BYTES") {
            Some(s) => s
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => DEFAULT_HTTP_BODY_LIMIT_BYTES,
        };

        Ok(Self {
            addr,
            app_env,
            jwt_secret,
            jwt_ttl: Duration::from_secs(jwt_ttl_seconds),
            database_url,
            http_timeout: Duration::from_secs(http_timeout_seconds),
            http_body_limit_bytes,
        })
    }
}

fn positive_u64(
    value: Option<String>,
    default: u64,
    key: &'static str,
) -> Result<u64, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid(key)),
    }
}
