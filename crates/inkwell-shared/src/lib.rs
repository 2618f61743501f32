//! # Inkwell Shared
//!
//! Wire types shared by the server and its clients: request and response
//! DTOs with field validation, and RFC 7807 error documents.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
