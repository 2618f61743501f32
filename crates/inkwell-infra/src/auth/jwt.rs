//! JWT token service implementation.

use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use inkwell_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expiration_minutes: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            algorithm: Algorithm::HS256,
            expiration_minutes: 30,
            issuer: "inkwell-api".to_string(),
        }
    }
}

/// Invalid token configuration, reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum JwtConfigError {
    #[error("Unsupported token algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("ACCESS_TOKEN_EXPIRE_MINUTES must be a positive integer, got '{0}'")]
    InvalidExpiry(String),
}

impl JwtConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, JwtConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    ///
    /// Reads `SECRET_KEY` (falling back to `JWT_SECRET`), `ALGORITHM`,
    /// `ACCESS_TOKEN_EXPIRE_MINUTES` and `JWT_ISSUER`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, JwtConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let secret = lookup("SECRET_KEY")
            .or_else(|| lookup("JWT_SECRET"))
            .unwrap_or(defaults.secret);

        // Warn if using default secret in production
        if secret == DEFAULT_SECRET {
            let is_production = lookup("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default token secret in production! Set SECRET_KEY environment variable."
                );
            } else {
                tracing::warn!("Using default token secret. Set SECRET_KEY for production use.");
            }
        }

        let algorithm = match lookup("ALGORITHM") {
            Some(name) => parse_algorithm(&name)?,
            None => defaults.algorithm,
        };

        let expiration_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => return Err(JwtConfigError::InvalidExpiry(raw)),
            },
            None => defaults.expiration_minutes,
        };

        Ok(Self {
            secret,
            algorithm,
            expiration_minutes,
            issuer: lookup("JWT_ISSUER").unwrap_or(defaults.issuer),
        })
    }
}

/// Only symmetric HMAC algorithms fit a shared secret.
fn parse_algorithm(name: &str) -> Result<Algorithm, JwtConfigError> {
    match Algorithm::from_str(name.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(JwtConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Internal JWT claims structure for serialization.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    exp: i64,    // expiration timestamp
    iat: i64,    // issued at
    iss: String, // issuer
}

/// JWT-based token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    fn encode_claims(&self, user_id: i32, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let exp = issued_at + TimeDelta::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: issued_at.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue_token(&self, user_id: i32) -> Result<String, AuthError> {
        self.encode_claims(user_id, Utc::now())
    }

    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id = token_data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|e| AuthError::InvalidToken(format!("bad subject: {}", e)))?;

        Ok(TokenClaims {
            user_id,
            exp: token_data.claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.expiration_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            algorithm: Algorithm::HS256,
            expiration_minutes: 60,
            issuer: "test-issuer".to_string(),
        }
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let service = JwtTokenService::new(test_config());

        for user_id in [1, 42, i32::MAX] {
            let token = service.issue_token(user_id).unwrap();
            assert!(!token.is_empty());
            let claims = service.verify_token(&token).unwrap();
            assert_eq!(claims.user_id, user_id);
        }
    }

    #[test]
    fn test_exp_is_ttl_after_issue() {
        let service = JwtTokenService::new(test_config());
        let before = Utc::now().timestamp();

        let claims = service
            .verify_token(&service.issue_token(7).unwrap())
            .unwrap();

        assert!(claims.exp >= before + 3600);
        assert!(claims.exp <= Utc::now().timestamp() + 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtTokenService::new(test_config());
        let long_ago = Utc::now() - TimeDelta::hours(3);

        let token = service.encode_claims(7, long_ago).unwrap();

        assert!(matches!(
            service.verify_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_just_past_expiry_is_rejected() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_minutes: 1,
            ..test_config()
        });
        // exp fell 30 seconds ago
        let issued_at = Utc::now() - TimeDelta::seconds(90);

        let token = service.encode_claims(7, issued_at).unwrap();

        assert!(matches!(
            service.verify_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_validate_invalid_token() {
        let service = JwtTokenService::new(test_config());

        let result = service.verify_token("invalid-token");

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtTokenService::new(test_config());
        let verifier = JwtTokenService::new(JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        });

        let token = issuer.issue_token(1).unwrap();

        assert!(matches!(
            verifier.verify_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_validate_wrong_issuer_token() {
        let service1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let service2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = service1.issue_token(1).unwrap();

        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_wrong_algorithm_is_rejected() {
        let hs256 = JwtTokenService::new(test_config());
        let hs512 = JwtTokenService::new(JwtConfig {
            algorithm: Algorithm::HS512,
            ..test_config()
        });

        let token = hs256.issue_token(1).unwrap();

        assert!(matches!(
            hs512.verify_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let service = JwtTokenService::new(test_config());
        let now = Utc::now();
        let claims = Claims {
            sub: "not-a-number".to_string(),
            exp: (now + TimeDelta::minutes(5)).timestamp(),
            iat: now.timestamp(),
            iss: "test-issuer".to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &service.encoding_key).unwrap();

        assert!(matches!(
            service.verify_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expiration_seconds() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_minutes: 30,
            ..test_config()
        });

        assert_eq!(service.expiration_seconds(), 1800);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = JwtConfig::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("ALGORITHM", "HS384"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "15"),
        ]))
        .unwrap();

        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.algorithm, Algorithm::HS384);
        assert_eq!(config.expiration_minutes, 15);
        assert_eq!(config.issuer, "inkwell-api");
    }

    #[test]
    fn test_config_defaults_and_secret_alias() {
        let config = JwtConfig::from_lookup(lookup_from(&[("JWT_SECRET", "alias")])).unwrap();

        assert_eq!(config.secret, "alias");
        assert_eq!(config.algorithm, Algorithm::HS256);
        assert_eq!(config.expiration_minutes, 30);
    }

    #[test]
    fn test_config_rejects_asymmetric_algorithm() {
        let result = JwtConfig::from_lookup(lookup_from(&[("ALGORITHM", "RS256")]));
        assert!(matches!(
            result,
            Err(JwtConfigError::UnsupportedAlgorithm(_))
        ));

        let result = JwtConfig::from_lookup(lookup_from(&[("ALGORITHM", "nope")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_bad_expiry() {
        for raw in ["0", "-5", "soon"] {
            let result =
                JwtConfig::from_lookup(lookup_from(&[("ACCESS_TOKEN_EXPIRE_MINUTES", raw)]));
            assert!(matches!(result, Err(JwtConfigError::InvalidExpiry(_))));
        }
    }
}
