//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use inkwell_core::domain::{NewPost, Post, PostWithLikes, User};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// JSON login body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OAuth2 password-flow login form. `username` carries the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl From<LoginForm> for LoginRequest {
    fn from(form: LoginForm) -> Self {
        Self {
            email: form.username,
            password: form.password,
        }
    }
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub created: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created: user.created,
        }
    }
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

fn default_published() -> bool {
    true
}

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 2, max = 50, message = "Title must be 2-50 characters"))]
    pub title: String,
    #[validate(length(
        min = 150,
        max = 11000,
        message = "Content must be 150-11000 characters"
    ))]
    pub content: String,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

impl From<PostRequest> for NewPost {
    fn from(req: PostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            is_published: req.is_published,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub created: DateTime<Utc>,
    pub user_id: i32,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            is_published: post.is_published,
            created: post.created,
            user_id: post.user_id,
        }
    }
}

/// A post with its like count, as returned by listing and lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithLikesResponse {
    pub post: PostResponse,
    pub likes: i64,
}

impl From<PostWithLikes> for PostWithLikesResponse {
    fn from(entry: PostWithLikes) -> Self {
        Self {
            post: entry.post.into(),
            likes: entry.likes,
        }
    }
}

fn default_limit() -> u64 {
    10
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListParams {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub search: String,
}

/// Body of `POST /like` and `DELETE /like`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeRequest {
    pub post_id: i32,
}

/// Flatten `validator` errors into "field: message" strings.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_request(title_len: usize, content_len: usize) -> PostRequest {
        PostRequest {
            title: "t".repeat(title_len),
            content: "c".repeat(content_len),
            is_published: true,
        }
    }

    #[test]
    fn test_post_length_bounds() {
        assert!(post_request(2, 150).validate().is_ok());
        assert!(post_request(50, 11000).validate().is_ok());
        assert!(post_request(1, 150).validate().is_err());
        assert!(post_request(51, 150).validate().is_err());
        assert!(post_request(10, 149).validate().is_err());
        assert!(post_request(10, 11001).validate().is_err());
    }

    #[test]
    fn test_post_lengths_count_characters_not_bytes() {
        let req = PostRequest {
            title: "é".repeat(50),
            content: "ü".repeat(150),
            is_published: false,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_is_published_defaults_to_true() {
        let req: PostRequest =
            serde_json::from_str(r#"{"title": "Hi", "content": "body"}"#).unwrap();
        assert!(req.is_published);
    }

    #[test]
    fn test_create_user_validation() {
        let ok = CreateUserRequest {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = CreateUserRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let messages = validation_messages(&errors);
        assert_eq!(
            messages,
            vec![
                "email: Invalid email address".to_string(),
                "password: Password must not be empty".to_string(),
            ]
        );
    }

    #[test]
    fn test_list_params_defaults() {
        let params: PostListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 10);
        assert_eq!(params.skip, 0);
        assert!(params.search.is_empty());
    }

    #[test]
    fn test_user_response_omits_password() {
        let user = User {
            id: 3,
            email: "a@b.com".to_string(),
            password_hash: "secret-hash".to_string(),
            created: Utc::now(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["id"], 3);
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("secret-hash"));
    }
}
