use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - a blog post owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub created: DateTime<Utc>,
}

impl Post {
    /// Whether `user_id` is the recorded owner of this post.
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

/// The mutable fields of a post, used both for creation and for full
/// replacement on update. The owner is never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub is_published: bool,
}

/// A post together with the number of likes referencing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithLikes {
    pub post: Post,
    pub likes: i64,
}

/// Listing parameters: case-insensitive title substring plus limit/offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub search: String,
    pub limit: u64,
    pub offset: u64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            limit: 10,
            offset: 0,
        }
    }
}

impl PostQuery {
    /// Case-insensitive substring match against a title.
    pub fn matches(&self, title: &str) -> bool {
        self.search.is_empty() || title.to_lowercase().contains(&self.search.to_lowercase())
    }
}
