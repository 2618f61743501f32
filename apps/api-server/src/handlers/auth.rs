//! Login handler.

use actix_web::{Either, HttpResponse, web};

use inkwell_core::ports::AuthError;
use inkwell_shared::dto::{AuthResponse, LoginForm, LoginRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /login
///
/// Accepts a JSON `{email, password}` body or an OAuth2 password-flow form
/// (`username` carries the email). Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login(
    state: web::Data<AppState>,
    body: Either<web::Json<LoginRequest>, web::Form<LoginForm>>,
) -> AppResult<HttpResponse> {
    let credentials = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner().into(),
    };

    let user = state.users.find_by_email(&credentials.email).await?;

    let verified = match &user {
        Some(user) => {
            let passwords = state.passwords.clone();
            let hash = user.password_hash.clone();
            let password = credentials.password;

            web::block(move || passwords.verify(&password, &hash))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??
        }
        None => false,
    };

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::debug!("Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let access_token = state.tokens.issue_token(user.id)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    }))
}
