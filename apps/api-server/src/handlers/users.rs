//! User handlers. Signup is public; lookups need a bearer token.

use actix_web::{HttpResponse, web};
use validator::Validate;

use inkwell_core::domain::NewUser;
use inkwell_core::error::DomainError;
use inkwell_core::ports::BaseRepository;
use inkwell_shared::dto::{CreateUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /users
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let passwords = state.passwords.clone();
    let password = req.password;
    let password_hash = web::block(move || passwords.hash(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .users
        .create(NewUser::new(req.email, password_hash))
        .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// GET /users
pub async fn list_users(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let users: Vec<UserResponse> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// GET /users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound {
            entity_type: "User",
            id,
        })?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
