//! HS256 JSON Web Tokens.
//!
//! Tokens are signed with a shared secret. `exp` is optional: tokens issued
//! without a lifetime never expire, which is how the service has always
//! issued them.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::MissingRequiredClaim(_) | ErrorKind::ImmatureSignature => {
                Self::invalid_claims(err.to_string())
            }
            ErrorKind::Json(_) => Self::invalid_claims(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,

    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,

    /// Issued at (Unix seconds).
    #[serde(default)]
    pub iat: i64,

    /// Expiration (Unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Creates claims issued now, expiring after `ttl_secs` if given.
    #[must_use]
    pub fn new(username: impl Into<String>, is_admin: bool, ttl_secs: Option<u64>) -> Self {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let exp = ttl_secs.map(|ttl| iat.saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX)));
        Self {
            username: username.into(),
            is_admin,
            iat,
            exp,
        }
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Signs and verifies tokens with a shared secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: Option<u64>,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates a new JWT service.
    ///
    /// # Arguments
    /// * `secret` - Shared HS256 secret
    /// * `token_ttl_secs` - Lifetime of tokens issued by [`create_token`](Self::create_token);
    ///   `None` issues tokens without `exp`
    #[must_use]
    pub fn new(secret: &str, token_ttl_secs: Option<u64>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation
    }

    /// Encodes claims into a JWT string.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and validates a JWT string.
    ///
    /// # Errors
    /// Returns an error if the signature, the expiry or the claims are invalid.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, JwtError> {
        decode(token, &self.decoding_key, &Self::validation()).map_err(JwtError::from)
    }

    /// Issues a token for a user.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn create_token(&self, username: &str, is_admin: bool) -> Result<String, JwtError> {
        self.encode(&Claims::new(username, is_admin, self.token_ttl_secs))
    }

    /// Decodes a token into [`Claims`].
    ///
    /// # Errors
    /// Returns an error if the token is not valid.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        Ok(self.decode::<Claims>(token)?.claims)
    }
}
