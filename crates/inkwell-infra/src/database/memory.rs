//! In-memory repositories - used when no database is configured, and in tests.
//!
//! All three repositories share one set of tables behind a single async
//! `RwLock`, so the uniqueness, ownership and cascade rules of the relational
//! schema hold here too: every check-then-write happens under one write guard.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use inkwell_core::domain::{Like, NewPost, NewUser, Post, PostQuery, PostWithLikes, User};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{BaseRepository, LikeRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    likes: BTreeMap<i32, Like>,
    next_user_id: i32,
    next_post_id: i32,
    next_like_id: i32,
}

impl Tables {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    fn like_count(&self, post_id: i32) -> i64 {
        self.likes.values().filter(|l| l.post_id == post_id).count() as i64
    }

    fn with_likes(&self, post: &Post) -> PostWithLikes {
        PostWithLikes {
            post: post.clone(),
            likes: self.like_count(post.id),
        }
    }

    fn owned_post_mut(&mut self, id: i32, owner_id: i32) -> Result<&mut Post, RepoError> {
        let post = self.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        if !post.is_owned_by(owner_id) {
            return Err(RepoError::Forbidden);
        }
        Ok(post)
    }
}

/// Shared in-memory tables. Note: Data is lost on process restart.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository { db: self.clone() }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository { db: self.clone() }
    }

    pub fn likes(&self) -> InMemoryLikeRepository {
        InMemoryLikeRepository { db: self.clone() }
    }

    /// Remove a user together with their posts and likes, and the likes on
    /// those posts.
    pub async fn delete_user(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        tables.posts.retain(|_, p| p.user_id != id);

        let Tables { posts, likes, .. } = &mut *tables;
        likes.retain(|_, l| l.user_id != id && posts.contains_key(&l.post_id));

        Ok(())
    }
}

pub struct InMemoryUserRepository {
    db: InMemoryDatabase,
}

pub struct InMemoryPostRepository {
    db: InMemoryDatabase,
}

pub struct InMemoryLikeRepository {
    db: InMemoryDatabase,
}

#[async_trait]
impl BaseRepository<User, i32> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.db.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.db.tables.write().await;

        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(RepoError::Constraint("Email already registered".to_string()));
        }

        let user = User {
            id: Tables::next_id(&mut tables.next_user_id),
            email: new_user.email,
            password_hash: new_user.password_hash,
            created: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.db.tables.read().await.users.values().cloned().collect())
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.db.tables.read().await.posts.get(&id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<Vec<PostWithLikes>, RepoError> {
        let tables = self.db.tables.read().await;

        Ok(tables
            .posts
            .values()
            .filter(|p| query.matches(&p.title))
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .map(|p| tables.with_likes(p))
            .collect())
    }

    async fn find_with_likes(&self, id: i32) -> Result<Option<PostWithLikes>, RepoError> {
        let tables = self.db.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.with_likes(p)))
    }

    async fn create(&self, owner_id: i32, new_post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.db.tables.write().await;

        // Mirrors the foreign key on posts.user_id.
        if !tables.users.contains_key(&owner_id) {
            return Err(RepoError::NotFound);
        }

        let post = Post {
            id: Tables::next_id(&mut tables.next_post_id),
            user_id: owner_id,
            title: new_post.title,
            content: new_post.content,
            is_published: new_post.is_published,
            created: Utc::now(),
        };
        tables.posts.insert(post.id, post.clone());

        Ok(post)
    }

    async fn update(&self, id: i32, owner_id: i32, changes: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.db.tables.write().await;
        let post = tables.owned_post_mut(id, owner_id)?;

        post.title = changes.title;
        post.content = changes.content;
        post.is_published = changes.is_published;

        Ok(post.clone())
    }

    async fn delete(&self, id: i32, owner_id: i32) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;
        tables.owned_post_mut(id, owner_id)?;

        tables.posts.remove(&id);
        tables.likes.retain(|_, l| l.post_id != id);

        Ok(())
    }
}

#[async_trait]
impl LikeRepository for InMemoryLikeRepository {
    async fn like(&self, user_id: i32, post_id: i32) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;

        if !tables.posts.contains_key(&post_id) || !tables.users.contains_key(&user_id) {
            return Err(RepoError::NotFound);
        }

        if tables
            .likes
            .values()
            .any(|l| l.user_id == user_id && l.post_id == post_id)
        {
            return Err(RepoError::Constraint("User can like the same post only once".to_string()));
        }

        let like = Like {
            id: Tables::next_id(&mut tables.next_like_id),
            user_id,
            post_id,
            created: Utc::now(),
        };
        tables.likes.insert(like.id, like);

        Ok(())
    }

    async fn unlike(&self, user_id: i32, post_id: i32) -> Result<(), RepoError> {
        let mut tables = self.db.tables.write().await;

        let id = tables
            .likes
            .values()
            .find(|l| l.user_id == user_id && l.post_id == post_id)
            .map(|l| l.id)
            .ok_or(RepoError::NotFound)?;
        tables.likes.remove(&id);

        Ok(())
    }
}
