//! Authentication and authorization ports.

/// Claims carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: i32,
    /// Expiry as a UNIX timestamp in seconds.
    pub exp: i64,
}

/// Token service trait for issuing and verifying bearer tokens.
pub trait TokenService: Send + Sync {
    /// Mint a signed token for a user that expires after the configured TTL.
    fn issue_token(&self, user_id: i32) -> Result<String, AuthError>;

    /// Verify signature, issuer and expiry, and decode the claims.
    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
///
/// Implementations must salt every hash and compare in constant time.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
