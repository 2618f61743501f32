#[cfg(feature = "postgres")]
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the database pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
        }
    }

    /// Compose a Postgres URL from its parts.
    pub fn from_parts(host: &str, db: &str, user: &str, password: &str) -> Self {
        Self::new(format!("postgres://{}:{}@{}/{}", user, password, host, db))
    }

    pub fn with_pool(mut self, max_connections: u32, min_connections: u32) -> Self {
        self.max_connections = max_connections;
        self.min_connections = min_connections.min(max_connections);
        self
    }
}

/// Open the connection pool.
///
/// The pool is the only process-wide database state; every repository call
/// borrows a connection from it for the duration of one statement or
/// transaction.
#[cfg(feature = "postgres")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!("Initializing database connection pool...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let conn = Database::connect(opts).await?;
    tracing::info!("Database connected (pool: {})", config.max_connections);

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let config = DatabaseConfig::from_parts("db.local", "blog", "app", "pw");
        assert_eq!(config.url, "postgres://app:pw@db.local/blog");
        assert_eq!(config.max_connections, 20);
    }

    #[test]
    fn test_pool_min_never_exceeds_max() {
        let config = DatabaseConfig::new("postgres://x").with_pool(5, 10);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.min_connections, 5);
    }
}
