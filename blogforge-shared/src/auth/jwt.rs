//! JWT token issuance and validation
//!
//! Tokens are signed with HS256 (HMAC-SHA256) over a secret handed to
//! [`TokenService`] at construction. There is no server-side token state:
//! a token is valid exactly while its signature verifies and the current
//! time lies inside `[nbf, exp]`.
//!
//! # Token Types
//!
//! - **Access Token**: short-lived, accepted by the auth gate
//! - **Refresh Token**: long-lived, only exchanged for a new access token
//!
//! Both flavours carry the same claims and differ only in lifetime and
//! the `token_type` marker.
//!
//! # Example
//!
//! ```
//! use blogforge_shared::auth::jwt::{JwtConfig, TokenService};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = TokenService::new(JwtConfig::new("a-secret-that-is-at-least-32-bytes!!"));
//!
//! let token = tokens.issue_access_token(7, "alice", "user")?;
//! let claims = tokens.parse_token(&token)?;
//! assert_eq!(claims.sub, 7);
//! assert_eq!(claims.username, "alice");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The signing secret was never configured
    #[error("JWT secret is not initialized")]
    MissingSecret,

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token `nbf` lies in the future
    #[error("Token is not valid yet")]
    NotYetValid,

    /// Signature, encoding or claim shape is wrong
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// A refresh token was presented where an access token is required, or vice versa
    #[error("Expected {} token, got {}", .expected.as_str(), .actual.as_str())]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived)
    Access,

    /// Refresh token (long-lived)
    Refresh,
}

impl TokenType {
    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iat`: Issued at timestamp
/// - `nbf`: Not before timestamp
/// - `exp`: Expiration timestamp
///
/// # Custom Claims
///
/// - `username`: Login name at issuance time
/// - `role`: Role string checked by the role gate
/// - `token_type`: Access or refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: i64,

    /// Username of the subject
    pub username: String,

    /// Role of the subject (`admin` or `user`)
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims valid from now until `now + expires_in`
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        role: impl Into<String>,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            username: username.into(),
            role: role.into(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            token_type,
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Token lifetimes and signing secret
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret; an empty secret makes every issuance fail
    pub secret: String,

    /// Lifetime of access tokens
    pub access_ttl: Duration,

    /// Lifetime of refresh tokens
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    /// Creates a config with the default lifetimes (24 hours / 7 days)
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::hours(24),
            refresh_ttl: Duration::hours(168),
        }
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    has_secret: bool,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

/// Issues and verifies signed tokens
///
/// Cheap to clone; the keys are shared behind an `Arc` and never mutated
/// after construction, so one instance serves every request concurrently.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.keys.access_ttl)
            .field("refresh_ttl", &self.keys.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Builds the service from a config
    pub fn new(config: JwtConfig) -> Self {
        let secret = config.secret.as_bytes();

        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                has_secret: !secret.is_empty(),
                access_ttl: config.access_ttl,
                refresh_ttl: config.refresh_ttl,
            }),
        }
    }

    /// Issues an access token for the given identity
    ///
    /// # Errors
    ///
    /// Returns `JwtError::MissingSecret` if the service was built with an
    /// empty secret.
    pub fn issue_access_token(
        &self,
        user_id: i64,
        username: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(
            user_id,
            username,
            role,
            TokenType::Access,
            self.keys.access_ttl,
        );
        self.sign(&claims)
    }

    /// Issues a refresh token for the given identity
    pub fn issue_refresh_token(
        &self,
        user_id: i64,
        username: &str,
        role: &str,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(
            user_id,
            username,
            role,
            TokenType::Refresh,
            self.keys.refresh_ttl,
        );
        self.sign(&claims)
    }

    /// Signs arbitrary claims with HS256
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        if !self.keys.has_secret {
            return Err(JwtError::MissingSecret);
        }

        encode(&Header::new(Algorithm::HS256), claims, &self.keys.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies signature and validity window, returning the embedded claims
    ///
    /// No leeway is applied: a token is rejected the second after `exp`
    /// and until the second of `nbf`.
    pub fn parse_token(&self, token: &str) -> Result<Claims, JwtError> {
        if !self.keys.has_secret {
            return Err(JwtError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::ImmatureSignature => JwtError::NotYetValid,
                _ => JwtError::Invalid(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }

    /// Parses a token and requires it to be an access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.parse_expecting(token, TokenType::Access)
    }

    /// Parses a token and requires it to be a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.parse_expecting(token, TokenType::Refresh)
    }

    /// Exchanges a refresh token for a new access token with the same identity
    ///
    /// The refresh token goes through the same validation as any other token
    /// and is not rotated.
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<String, JwtError> {
        let claims = self.validate_refresh_token(refresh_token)?;
        self.issue_access_token(claims.sub, &claims.username, &claims.role)
    }

    fn parse_expecting(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.parse_token(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> TokenService {
        TokenService::new(JwtConfig::new(SECRET))
    }

    #[test]
    fn test_access_token_roundtrip() {
        let tokens = service();
        let token = tokens.issue_access_token(42, "alice", "admin").unwrap();

        let claims = tokens.parse_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.iat, claims.nbf);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_refresh_token_lives_longer() {
        let tokens = service();
        let access = tokens.parse_token(&tokens.issue_access_token(1, "bob", "user").unwrap()).unwrap();
        let refresh = tokens.parse_token(&tokens.issue_refresh_token(1, "bob", "user").unwrap()).unwrap();

        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_empty_secret_rejects_issuance() {
        let tokens = TokenService::new(JwtConfig::new(""));
        let result = tokens.issue_access_token(1, "bob", "user");
        assert!(matches!(result, Err(JwtError::MissingSecret)));
    }

    #[test]
    fn test_expired_token() {
        let tokens = service();
        let claims = Claims::new(1, "bob", "user", TokenType::Access, Duration::seconds(-10));
        let token = tokens.sign(&claims).unwrap();

        let result = tokens.parse_token(&token);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_not_yet_valid_token() {
        let tokens = service();
        let mut claims = Claims::new(1, "bob", "user", TokenType::Access, Duration::hours(2));
        claims.nbf = Utc::now().timestamp() + 3600;
        let token = tokens.sign(&claims).unwrap();

        let result = tokens.parse_token(&token);
        assert!(matches!(result, Err(JwtError::NotYetValid)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = service().issue_access_token(1, "bob", "user").unwrap();
        let other = TokenService::new(JwtConfig::new("a-completely-different-secret-value!!"));

        assert!(matches!(other.parse_token(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            service().parse_token("not.a.token"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_token_type_checks() {
        let tokens = service();
        let access = tokens.issue_access_token(1, "bob", "user").unwrap();
        let refresh = tokens.issue_refresh_token(1, "bob", "user").unwrap();

        assert!(tokens.validate_access_token(&access).is_ok());
        assert!(tokens.validate_refresh_token(&refresh).is_ok());
        assert!(matches!(
            tokens.validate_access_token(&refresh),
            Err(JwtError::WrongType { .. })
        ));
        assert!(matches!(
            tokens.validate_refresh_token(&access),
            Err(JwtError::WrongType { .. })
        ));
    }

    #[test]
    fn test_refresh_access_token_keeps_identity() {
        let tokens = service();
        let refresh = tokens.issue_refresh_token(9, "carol", "admin").unwrap();

        let access = tokens.refresh_access_token(&refresh).unwrap();
        let claims = tokens.validate_access_token(&access).unwrap();

        assert_eq!(claims.sub, 9);
        assert_eq!(claims.username, "carol");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_refresh_rejects_access_token() {
        let tokens = service();
        let access = tokens.issue_access_token(9, "carol", "admin").unwrap();
        assert!(tokens.refresh_access_token(&access).is_err());
    }
}
