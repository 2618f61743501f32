//! Application state - shared across all handlers.

use std::sync::Arc;

use inkwell_core::ports::{
    LikeRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use inkwell_infra::{Argon2PasswordService, InMemoryDatabase, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// A configured database that cannot be reached is a startup error; only
    /// a missing configuration falls back to memory.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            let db = inkwell_infra::connect(db_config).await?;

            if config.run_migrations {
                use migration::MigratorTrait;

                tracing::info!("Applying pending migrations");
                migration::Migrator::up(&db, None).await?;
            }

            let (users, posts, likes) = inkwell_infra::postgres_repositories(db);
            tracing::info!("Application state initialized (postgres)");

            return Ok(Self {
                users: Arc::new(users),
                posts: Arc::new(posts),
                likes: Arc::new(likes),
                tokens,
                passwords,
            });
        }

        tracing::warn!("No database configured. Running in in-memory mode; data is not persisted.");

        Ok(Self::in_memory(&InMemoryDatabase::new(), tokens, passwords))
    }

    /// State backed by the in-memory repositories.
    pub fn in_memory(
        db: &InMemoryDatabase,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users: Arc::new(db.users()),
            posts: Arc::new(db.posts()),
            likes: Arc::new(db.likes()),
            tokens,
            passwords,
        }
    }
}
