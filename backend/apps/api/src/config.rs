//! Environment configuration
//!
//! Read once at startup; nothing here changes afterwards.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;

/// Minimum HMAC secret length accepted outside debug builds
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let port = parse_var("APP_PORT", 8080)?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let mut auth = if cfg!(debug_assertions) && env::var("JWT_SECRET").is_err() {
            tracing::warn!("JWT_SECRET not set, using a random development secret");
            AuthConfig::development()
        } else {
            let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set in production")?;
            if secret.len() < MIN_JWT_SECRET_LEN {
                bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes");
            }
            AuthConfig {
                jwt_secret: secret.into_bytes(),
                ..AuthConfig::default()
            }
        };

        auth.google_client_id = optional_var("GOOGLE_CLIENT_ID");
        auth.line_channel_id = optional_var("LINE_CHANNEL_ID");
        auth.access_token_ttl = Duration::from_secs(parse_var(
            "ACCESS_TOKEN_TTL_SECS",
            auth.access_token_ttl.as_secs(),
        )?);
        auth.refresh_session_ttl = Duration::from_secs(parse_var(
            "REFRESH_SESSION_TTL_SECS",
            auth.refresh_session_ttl.as_secs(),
        )?);
        auth.provider_timeout = Duration::from_secs(parse_var(
            "PROVIDER_TIMEOUT_SECS",
            auth.provider_timeout.as_secs(),
        )?);

        Ok(Self {
            database_url,
            redis_url,
            port,
            frontend_origins,
            auth,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
