use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Like relation - a user liked a post. At most one per (user, post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: i32,
    pub user_id: i32,
    pub post_id: i32,
    pub created: DateTime<Utc>,
}
