//! Authentication middleware and extractors.

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError,
    dev::Payload,
    http::{StatusCode, header},
    web,
};
use futures::future::LocalBoxFuture;
use std::future::ready;

use inkwell_core::ports::{AuthError, BaseRepository};
use inkwell_shared::ErrorResponse;

use crate::state::AppState;

const FAILED_AUTHORIZATION: &str = "Failed authorization";

/// Authenticated user identity extractor.
///
/// Verifies the bearer token and resolves its subject to an existing user
/// before the handler runs:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i32,
    pub email: String,
}

/// Error type for authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// Missing, malformed, invalid or expired token. Always rendered the same.
    #[error("{0}")]
    Rejected(AuthError),

    /// The token is valid but its user no longer exists.
    #[error("User not found")]
    UnknownUser,

    #[error("Authentication unavailable: {0}")]
    Unavailable(String),
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::Rejected(_) => StatusCode::FORBIDDEN,
            AuthenticationError::UnknownUser => StatusCode::NOT_FOUND,
            AuthenticationError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthenticationError::Rejected(_) => HttpResponse::Forbidden()
                .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
                .json(ErrorResponse::forbidden(FAILED_AUTHORIZATION)),
            AuthenticationError::UnknownUser => {
                HttpResponse::NotFound().json(ErrorResponse::not_found("User not found"))
            }
            AuthenticationError::Unavailable(detail) => {
                tracing::error!("Authentication unavailable: {}", detail);
                HttpResponse::InternalServerError().json(ErrorResponse::internal_error())
            }
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`. The scheme is
/// case-insensitive.
fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    match value.trim().split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim().to_string())
        }
        _ => Err(AuthError::InvalidToken("Expected Bearer token".to_string())),
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            return Box::pin(ready(Err(AuthenticationError::Unavailable(
                "AppState not found in app data".to_string(),
            ))));
        };

        // Token failures resolve on first poll, ahead of any body extractor.
        let claims = match bearer_token(req).and_then(|token| state.tokens.verify_token(&token)) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(reason = %e, "Rejected bearer token");
                return Box::pin(ready(Err(AuthenticationError::Rejected(e))));
            }
        };

        Box::pin(async move {
            let user = state
                .users
                .find_by_id(claims.user_id)
                .await
                .map_err(|e| AuthenticationError::Unavailable(e.to_string()))?
                .ok_or_else(|| {
                    tracing::debug!(user_id = claims.user_id, "Token subject no longer exists");
                    AuthenticationError::UnknownUser
                })?;

            Ok(Identity {
                user_id: user.id,
                email: user.email,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc.def");

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer  abc.def "))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc.def");
    }

    #[test]
    fn test_bearer_token_rejections() {
        let missing = TestRequest::default().to_http_request();
        assert!(matches!(bearer_token(&missing), Err(AuthError::MissingAuth)));

        for value in ["Basic dXNlcjpwdw==", "Bearer", "Bearer   ", "token"] {
            let req = TestRequest::default()
                .insert_header((header::AUTHORIZATION, value))
                .to_http_request();
            assert!(
                matches!(bearer_token(&req), Err(AuthError::InvalidToken(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejections_render_identically() {
        let expired = AuthenticationError::Rejected(AuthError::TokenExpired).error_response();
        let missing = AuthenticationError::Rejected(AuthError::MissingAuth).error_response();

        for response in [expired, missing] {
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
        }
    }
}
