use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - a registered account.
///
/// `password_hash` is the opaque output of the password service and must
/// never leave the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub created: DateTime<Utc>,
}

/// Fields required to persist a new user. Identity and creation time are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}
