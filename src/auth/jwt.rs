use crate::auth::clock::Clock;
use crate::types::{Claims, Role};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::sync::Arc;

/// Lifetime of a freshly issued or refreshed session token.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Longest token lifetime a configuration may ask for: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Failures while issuing or verifying a session token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Token service for session JWT issuance, verification and refresh.
///
/// Tokens are signed with HS256 using a process-wide secret. Verification
/// accepts only the HMAC family, so a token re-labelled with an asymmetric or
/// `none` algorithm is rejected before its signature is looked at.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a new TokenService.
    ///
    /// # Arguments
    /// * `secret` - Shared signing secret (should be at least 32 bytes)
    /// * `ttl` - Validity of each issued or refreshed token
    /// * `clock` - Time source for `iat`/`exp` and expiry checks
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed token for the given identity.
    pub fn issue(&self, user_id: i64, username: &str, role: Role) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            id: user_id,
            username: username.to_string(),
            role,
            exp: self.expiry_from(now)?,
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    /// Verifies signature, algorithm and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Re-signs already verified claims with a fresh expiry.
    ///
    /// Neither the original signature nor the user record is consulted here;
    /// callers must have verified the token first.
    pub fn refresh(&self, claims: &Claims) -> Result<String, TokenError> {
        let now = self.clock.now();
        let refreshed = Claims {
            exp: self.expiry_from(now)?,
            iat: now.timestamp(),
            ..claims.clone()
        };
        self.sign(&refreshed)
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<i64, TokenError> {
        now.checked_add_signed(self.ttl)
            .map(|exp| exp.timestamp())
            .ok_or_else(|| TokenError::Signing("token expiry is out of range".to_string()))
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
