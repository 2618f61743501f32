//! # Inkwell Core
//!
//! The domain layer of the Inkwell blog backend.
//! This crate contains the entities, the error taxonomy and the ports
//! (traits) that infrastructure implements. It performs no I/O.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
