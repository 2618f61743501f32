//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} with id {id} was not found")]
    NotFound { entity_type: &'static str, id: i32 },
}

/// Repository-level errors.
///
/// Adapters translate driver failures into these variants so that raw
/// database errors never cross the port boundary.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Acting user does not own the entity")]
    Forbidden,
}
