use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub db: DbConfig,
    /// Resolve identity from `?userId=` when no valid bearer token is sent.
    /// Only meant for trusted local setups.
    pub trust_user_id_param: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "lifetrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "lifetrack-users".into()),
            ttl_minutes: check_ttl(env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7))?,
        };
        if jwt.secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        let db = DbConfig {
            max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(10),
            acquire_timeout_secs: env_parse("DB_ACQUIRE_TIMEOUT_SECS").unwrap_or(5),
        };
        let trust_user_id_param = std::env::var("TRUST_USER_ID_PARAM")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Ok(Self {
            database_url,
            jwt,
            db,
            trust_user_id_param,
        })
    }
}

/// One year; larger values overflow token expiry arithmetic.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

fn check_ttl(minutes: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
