use async_trait::async_trait;

use crate::domain::{NewPost, NewUser, Post, PostQuery, PostWithLikes, User};
use crate::error::RepoError;

/// Generic lookup shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// Credential store.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Persist a new user. A taken email yields `RepoError::Constraint`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All users, ordered by id.
    async fn list(&self) -> Result<Vec<User>, RepoError>;
}

/// Post store.
///
/// `update` and `delete` check ownership and then guard the write with both
/// the id and the owner, so a post deleted concurrently surfaces as
/// `RepoError::NotFound` rather than a phantom success.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Filtered, paginated listing with like counts, ordered by id.
    async fn list(&self, query: &PostQuery) -> Result<Vec<PostWithLikes>, RepoError>;

    /// A single post with its like count.
    async fn find_with_likes(&self, id: i32) -> Result<Option<PostWithLikes>, RepoError>;

    /// Create a post owned by `owner_id`.
    async fn create(&self, owner_id: i32, post: NewPost) -> Result<Post, RepoError>;

    /// Replace all mutable fields. `NotFound` or `Forbidden` on failure.
    async fn update(&self, id: i32, owner_id: i32, changes: NewPost) -> Result<Post, RepoError>;

    /// Remove a post and, by cascade, its likes. `NotFound` or `Forbidden`.
    async fn delete(&self, id: i32, owner_id: i32) -> Result<(), RepoError>;
}

/// Like store.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Record that `user_id` likes `post_id`.
    ///
    /// `NotFound` if the post does not exist, `Constraint` if the pair
    /// already exists.
    async fn like(&self, user_id: i32, post_id: i32) -> Result<(), RepoError>;

    /// Remove the pair. `NotFound` if it does not exist.
    async fn unlike(&self, user_id: i32, post_id: i32) -> Result<(), RepoError>;
}
