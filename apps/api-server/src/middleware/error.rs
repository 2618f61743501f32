//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpRequest, HttpResponse, ResponseError, error, http::StatusCode, web};
use inkwell_core::error::{DomainError, RepoError};
use inkwell_core::ports::AuthError;
use inkwell_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation errors: {0:?}")]
    Validation(Vec<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized(detail),
            AppError::Forbidden(detail) => ErrorResponse::forbidden(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
            AppError::Validation(errors) => ErrorResponse::validation_failed(errors.join(", ")),
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

pub const NOT_OWNER: &str = "Unauthorized access";

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
        }
    }
}

pub const FAILED_AUTHENTICATION: &str = "Failed authentication";

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized(FAILED_AUTHENTICATION.to_string())
            }
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth => {
                AppError::Forbidden("Failed authorization".to_string())
            }
            AuthError::TokenCreation(msg) | AuthError::HashingError(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Forbidden => AppError::Forbidden(NOT_OWNER.to_string()),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(inkwell_shared::dto::validation_messages(&errors))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Extractor configs that report malformed bodies, query strings and path
/// segments as 422 problem documents.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::FormConfig::default().error_handler(form_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));
}

fn unprocessable(detail: String) -> error::Error {
    AppError::Validation(vec![detail]).into()
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    unprocessable(err.to_string())
}

fn form_error(err: error::UrlencodedError, _req: &HttpRequest) -> error::Error {
    tracing::debug!(error = %err, "Rejected form body");
    unprocessable(err.to_string())
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    unprocessable(err.to_string())
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> error::Error {
    unprocessable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_errors_map_to_statuses() {
        let cases = [
            (RepoError::NotFound, StatusCode::NOT_FOUND),
            (RepoError::Forbidden, StatusCode::FORBIDDEN),
            (RepoError::Constraint("dup".into()), StatusCode::CONFLICT),
            (RepoError::Query("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (RepoError::Connection("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (repo_err, status) in cases {
            assert_eq!(AppError::from(repo_err).status_code(), status);
        }
    }

    #[test]
    fn test_domain_not_found_keeps_message() {
        let err = AppError::from(DomainError::NotFound {
            entity_type: "Post",
            id: 4,
        });

        assert!(matches!(&err, AppError::NotFound(msg) if msg == "Post with id 4 was not found"));
    }

    #[test]
    fn test_auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::TokenExpired, StatusCode::FORBIDDEN),
            (AuthError::MissingAuth, StatusCode::FORBIDDEN),
            (AuthError::HashingError("salt".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (auth_err, status) in cases {
            assert_eq!(AppError::from(auth_err).status_code(), status);
        }

        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized(msg) if msg == FAILED_AUTHENTICATION
        ));
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let response = AppError::Internal("secret stack trace".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
