//! # Inkwell Infrastructure
//!
//! Concrete implementations of the ports defined in `inkwell-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - without `postgres` - in-memory repositories only
//!
//! JWT tokens and Argon2 password hashing are always available.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtConfigError, JwtTokenService};
pub use database::{
    DatabaseConfig, InMemoryDatabase, InMemoryLikeRepository, InMemoryPostRepository,
    InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use database::{
    PostgresLikeRepository, PostgresPostRepository, PostgresUserRepository, connect,
    postgres_repositories,
};
