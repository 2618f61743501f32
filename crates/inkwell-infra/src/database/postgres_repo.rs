//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};

use inkwell_core::domain::{NewPost, NewUser, Post, PostQuery, PostWithLikes, User};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{LikeRepository, PostRepository, UserRepository};

use super::entity::like::{self, Entity as LikeEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL like repository.
pub type PostgresLikeRepository = PostgresBaseRepository<LikeEntity>;

/// Build all three repositories over one pool.
pub fn postgres_repositories(
    db: DatabaseConnection,
) -> (
    PostgresUserRepository,
    PostgresPostRepository,
    PostgresLikeRepository,
) {
    let db = Arc::new(db);
    (
        PostgresUserRepository::shared(Arc::clone(&db)),
        PostgresPostRepository::shared(Arc::clone(&db)),
        PostgresLikeRepository::shared(db),
    )
}

/// Mask an email for logging to avoid PII in logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let masked = mask_email(&new_user.email);

        let model = user::ActiveModel {
            email: Set(new_user.email),
            password: Set(new_user.password_hash),
            ..Default::default()
        }
        .insert(self.conn())
        .await
        .map_err(|e| match map_db_err(e) {
            RepoError::Constraint(_) => {
                RepoError::Constraint("Email already registered".to_string())
            }
            other => other,
        })?;

        tracing::debug!(user_id = model.id, user_email = %masked, "User row inserted");

        Ok(model.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// Row shape of the post-with-like-count aggregate.
#[derive(Debug, FromQueryResult)]
struct PostWithLikesRow {
    id: i32,
    title: String,
    content: String,
    is_published: bool,
    created: DateTimeWithTimeZone,
    user_id: i32,
    likes: i64,
}

impl From<PostWithLikesRow> for PostWithLikes {
    fn from(row: PostWithLikesRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                user_id: row.user_id,
                title: row.title,
                content: row.content,
                is_published: row.is_published,
                created: row.created.into(),
            },
            likes: row.likes,
        }
    }
}

/// `posts LEFT JOIN likes GROUP BY posts.id` with `COUNT(likes.id) AS likes`.
fn select_with_likes() -> Select<PostEntity> {
    PostEntity::find()
        .column_as(Expr::col((LikeEntity, like::Column::Id)).count(), "likes")
        .join(JoinType::LeftJoin, post::Relation::Likes.def())
        .group_by(post::Column::Id)
}

/// Escape LIKE metacharacters so the search text matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<Vec<PostWithLikes>, RepoError> {
        let mut select = select_with_likes();

        if !query.search.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Title))))
                    .like(LikeExpr::new(like_pattern(&query.search)).escape('\\')),
            );
        }

        let rows = select
            .order_by_asc(post::Column::Id)
            .limit(query.limit)
            .offset(query.offset)
            .into_model::<PostWithLikesRow>()
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_with_likes(&self, id: i32) -> Result<Option<PostWithLikes>, RepoError> {
        let row = select_with_likes()
            .filter(post::Column::Id.eq(id))
            .into_model::<PostWithLikesRow>()
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, owner_id: i32, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            title: Set(new_post.title),
            content: Set(new_post.content),
            is_published: Set(new_post.is_published),
            user_id: Set(owner_id),
            ..Default::default()
        }
        .insert(self.conn())
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, owner_id: i32, changes: NewPost) -> Result<Post, RepoError> {
        // Rolled back on drop if any step below fails.
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        let existing = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        if existing.user_id != owner_id {
            return Err(RepoError::Forbidden);
        }

        let updated = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(changes.title))
            .col_expr(post::Column::Content, Expr::value(changes.content))
            .col_expr(post::Column::IsPublished, Expr::value(changes.is_published))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(owner_id))
            .exec_with_returning(&txn)
            .await
            .map_err(map_db_err)?;

        let model = updated.into_iter().next().ok_or(RepoError::NotFound)?;
        txn.commit().await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: i32, owner_id: i32) -> Result<(), RepoError> {
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        let existing = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        if existing.user_id != owner_id {
            return Err(RepoError::Forbidden);
        }

        let result = PostEntity::delete_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::UserId.eq(owner_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn like(&self, user_id: i32, post_id: i32) -> Result<(), RepoError> {
        let post_exists = PostEntity::find_by_id(post_id)
            .one(self.conn())
            .await
            .map_err(map_db_err)?
            .is_some();

        if !post_exists {
            return Err(RepoError::NotFound);
        }

        // The unique index on (user_id, post_id) decides concurrent races.
        LikeEntity::insert(like::ActiveModel {
            user_id: Set(user_id),
            post_id: Set(post_id),
            ..Default::default()
        })
        .exec_without_returning(self.conn())
        .await
        .map_err(|e| match map_db_err(e) {
            RepoError::Constraint(_) => RepoError::Constraint("User can like the same post only once".to_string()),
            other => other,
        })?;

        Ok(())
    }

    async fn unlike(&self, user_id: i32, post_id: i32) -> Result<(), RepoError> {
        let result = LikeEntity::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("no-at-sign"), "***");
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("Rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
