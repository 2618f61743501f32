//! Post handlers. Every route requires an authenticated [`Identity`].

use actix_web::{HttpResponse, web};
use validator::Validate;

use inkwell_core::domain::PostQuery;
use inkwell_core::error::{DomainError, RepoError};
use inkwell_shared::dto::{PostListParams, PostRequest, PostResponse, PostWithLikesResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_not_found(id: i32) -> AppError {
    DomainError::NotFound {
        entity_type: "Post",
        id,
    }
    .into()
}

/// Repository errors for a specific post; `NotFound` names the post.
fn post_error(id: i32) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound => post_not_found(id),
        other => other.into(),
    }
}

/// GET /posts?limit&skip&search
pub async fn list_posts(
    state: web::Data<AppState>,
    _identity: Identity,
    params: web::Query<PostListParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let query = PostQuery {
        search: params.search,
        limit: params.limit,
        offset: params.skip,
    };

    let posts: Vec<PostWithLikesResponse> = state
        .posts
        .list(&query)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let post = state.posts.create(identity.user_id, req.into()).await?;

    tracing::info!(post_id = post.id, user_id = identity.user_id, "Post created");

    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_with_likes(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    Ok(HttpResponse::Ok().json(PostWithLikesResponse::from(post)))
}

/// PUT /posts/{id} - owner only; replaces title, content and publish flag.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    req.validate()?;

    let post = state
        .posts
        .update(id, identity.user_id, req.into())
        .await
        .map_err(post_error(id))?;

    tracing::info!(post_id = id, user_id = identity.user_id, "Post updated");

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// DELETE /posts/{id} - owner only.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    state
        .posts
        .delete(id, identity.user_id)
        .await
        .map_err(post_error(id))?;

    tracing::info!(post_id = id, user_id = identity.user_id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}
