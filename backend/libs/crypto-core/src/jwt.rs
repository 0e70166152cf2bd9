/// JWT issuance and validation for portfolio services
///
/// Tokens are signed with RS256 only. The signing key is only needed by the
/// process that issues tokens; validation needs the public key alone.
///
/// ## Usage
///
/// Call `initialize_jwt_keys()` once during startup, before any token
/// operation:
///
/// ```rust,ignore
/// use crypto_core::jwt;
///
/// let private_key = std::env::var("JWT_PRIVATE_KEY_PEM")?;
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM")?;
/// jwt::initialize_jwt_keys(&private_key, &public_key)?;
/// ```
///
/// There is no refresh token. An access token simply expires after one hour
/// and the user logs in again.
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

pub const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT keys not initialized")]
    NotInitialized,

    #[error("JWT keys already initialized")]
    AlreadyInitialized,

    #[error("invalid RSA key: {0}")]
    InvalidKey(String),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, JwtError>;

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject: the numeric user id rendered as a string
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub email: String,
    pub username: String,
    pub role: String,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<i32> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid(format!("non-numeric subject: {}", self.sub)))
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

// ============================================================================
// Key Storage
// ============================================================================

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize both keys from PEM strings. Can only succeed once per process.
pub fn initialize_jwt_keys(private_key_pem: &str, public_key_pem: &str) -> Result<()> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| JwtError::InvalidKey(format!("private key: {e}")))?;

    initialize_jwt_validation_only(public_key_pem)?;

    JWT_ENCODING_KEY
        .set(encoding_key)
        .map_err(|_| JwtError::AlreadyInitialized)
}

/// Initialize only the public key, for processes that never issue tokens.
pub fn initialize_jwt_validation_only(public_key_pem: &str) -> Result<()> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| JwtError::InvalidKey(format!("public key: {e}")))?;

    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| JwtError::AlreadyInitialized)
}

pub fn is_initialized() -> bool {
    JWT_DECODING_KEY.get().is_some()
}

fn get_encoding_key() -> Result<&'static EncodingKey> {
    JWT_ENCODING_KEY.get().ok_or(JwtError::NotInitialized)
}

fn get_decoding_key() -> Result<&'static DecodingKey> {
    JWT_DECODING_KEY.get().ok_or(JwtError::NotInitialized)
}

// ============================================================================
// Token Generation
// ============================================================================

/// Issue a one hour access token for a user.
pub fn generate_access_token(user_id: i32, email: &str, username: &str, role: &str) -> Result<String> {
    let now = Utc::now();
    let expiry = now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS);

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        email: email.to_string(),
        username: username.to_string(),
        role: role.to_string(),
    };

    encode_claims(&claims)
}

fn encode_claims(claims: &Claims) -> Result<String> {
    let encoding_key = get_encoding_key()?;
    encode(&Header::new(JWT_ALGORITHM), claims, encoding_key)
        .map_err(|e| JwtError::Signing(e.to_string()))
}

// ============================================================================
// Token Validation
// ============================================================================

/// Verify the signature and expiry of a token and return its claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let decoding_key = get_decoding_key()?;

    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;

    decode::<Claims>(token, decoding_key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};

    fn init_test_keys() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            initialize_jwt_keys(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY)
                .expect("Failed to initialize test keys");
        });
    }

    #[test]
    fn test_generate_access_token() {
        init_test_keys();

        let token = generate_access_token(42, "ana@example.com", "ana", "user")
            .expect("Failed to generate token");
        assert_eq!(token.matches('.').count(), 2);
    }

    #[test]
    fn test_validate_valid_token() {
        init_test_keys();

        let token = generate_access_token(42, "ana@example.com", "ana", "user").unwrap();
        let data = validate_token(&token).expect("token should validate");

        assert_eq!(data.claims.sub, "42");
        assert_eq!(data.claims.email, "ana@example.com");
        assert_eq!(data.claims.role, "user");
        assert_eq!(
            data.claims.exp - data.claims.iat,
            ACCESS_TOKEN_EXPIRY_HOURS * 3600
        );
    }

    #[test]
    fn test_validate_invalid_token() {
        init_test_keys();

        assert!(matches!(
            validate_token("invalid.token.here"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_tampered_token() {
        init_test_keys();

        let token = generate_access_token(7, "ana@example.com", "ana", "user").unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[2] = parts[2].chars().rev().collect();

        assert!(validate_token(&parts.join(".")).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        init_test_keys();

        let past = Utc::now() - Duration::hours(3);
        let claims = Claims {
            sub: "7".to_string(),
            iat: past.timestamp(),
            exp: (past + Duration::hours(1)).timestamp(),
            email: "ana@example.com".to_string(),
            username: "ana".to_string(),
            role: "user".to_string(),
        };
        let token = encode_claims(&claims).unwrap();

        assert!(matches!(validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_extract_user_id() {
        init_test_keys();

        let token = generate_access_token(1234, "ana@example.com", "ana", "admin").unwrap();
        let claims = validate_token(&token).unwrap().claims;
        assert_eq!(claims.user_id().unwrap(), 1234);
        assert!(claims.is_admin());
    }

    #[test]
    fn test_double_initialization_fails() {
        init_test_keys();

        assert!(matches!(
            initialize_jwt_validation_only(TEST_PUBLIC_KEY),
            Err(JwtError::AlreadyInitialized)
        ));
        assert!(is_initialized());
    }

    #[test]
    fn test_claims_helpers() {
        let claims = Claims {
            sub: "abc".to_string(),
            iat: 0,
            exp: 0,
            email: String::new(),
            username: String::new(),
            role: "admin".to_string(),
        };
        assert!(claims.is_admin());
        assert!(claims.user_id().is_err());
    }
}
