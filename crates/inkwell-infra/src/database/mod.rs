//! Persistence: PostgreSQL repositories over sea-orm, plus an in-memory
//! implementation of the same ports.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
pub use memory::{
    InMemoryDatabase, InMemoryLikeRepository, InMemoryPostRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
pub use connections::connect;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresLikeRepository, PostgresPostRepository, PostgresUserRepository, postgres_repositories,
};
