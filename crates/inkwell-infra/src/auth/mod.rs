//! Authentication implementations.

mod jwt;
mod password;

pub use jwt::{JwtConfig, JwtConfigError, JwtTokenService};
pub use password::Argon2PasswordService;
