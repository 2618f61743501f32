//! Like handlers.

use actix_web::{HttpResponse, web};

use inkwell_core::error::{DomainError, RepoError};
use inkwell_shared::dto::LikeRequest;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /like - 409 if already liked.
pub async fn like_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let post_id = body.post_id;

    state
        .likes
        .like(identity.user_id, post_id)
        .await
        .map_err(|err| match err {
            RepoError::NotFound => AppError::from(DomainError::NotFound {
                entity_type: "Post",
                id: post_id,
            }),
            other => other.into(),
        })?;

    tracing::info!(post_id, user_id = identity.user_id, "Post liked");

    Ok(HttpResponse::Created().finish())
}

/// DELETE /like - 404 if the caller has not liked the post.
pub async fn unlike_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let post_id = body.post_id;

    state
        .likes
        .unlike(identity.user_id, post_id)
        .await
        .map_err(|err| match err {
            RepoError::NotFound => AppError::NotFound("Like was not found".to_string()),
            other => other.into(),
        })?;

    tracing::info!(post_id, user_id = identity.user_id, "Post unliked");

    Ok(HttpResponse::NoContent().finish())
}
