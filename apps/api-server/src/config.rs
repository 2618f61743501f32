//! Application configuration loaded from environment variables.

use std::env;

use anyhow::Context;
use inkwell_infra::{DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub run_migrations: bool,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = Self::database(&lookup).map(|config| {
            let max = parse_or(&lookup, "DB_MAX_CONNECTIONS", config.max_connections);
            let min = parse_or(&lookup, "DB_MIN_CONNECTIONS", config.min_connections);
            config.with_pool(max, min)
        });

        let jwt = JwtConfig::from_lookup(&lookup).context("invalid token configuration")?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            database,
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            jwt,
        })
    }

    /// `DATABASE_URL` wins; otherwise all four `POSTGRES_*` parts are required.
    fn database<F>(lookup: &F) -> Option<DatabaseConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            return Some(DatabaseConfig::new(url));
        }

        let host = lookup("POSTGRES_HOST")?;
        let db = lookup("POSTGRES_DB")?;
        let user = lookup("POSTGRES_USER")?;
        let password = lookup("POSTGRES_PASSWORD")?;

        Some(DatabaseConfig::from_parts(&host, &db, &user, &password))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
