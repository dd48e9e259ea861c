use std::env;

use anyhow::Context;

use crate::db::retry::RetryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }

    pub fn is_development(self) -> bool {
        self == AppEnv::Development
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub env: AppEnv,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub db_retry: RetryConfig,
    pub db_health_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let env = env::var("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        let db_retry = RetryConfig::new()
            .with_max_retries(parse_or("DB_CONNECT_RETRIES", 5))
            .with_initial_delay(parse_or("DB_RETRY_INITIAL_MS", 200))
            .with_max_delay(parse_or("DB_RETRY_MAX_MS", 5000));

        Ok(Self {
            port,
            database_url,
            host,
            env,
            jwt_secret,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24),
            db_retry,
            db_health_interval_secs: parse_or("DB_HEALTH_INTERVAL_SECS", 30),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_defaults_to_development() {
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse(" PROD "), AppEnv::Production);
        assert_eq!(AppEnv::parse("development"), AppEnv::Development);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
        assert!(AppEnv::parse("").is_development());
    }

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or("ECOMMERCE_BACKOFFICE_TEST_UNSET_KEY", 42u16), 42);
    }
}
