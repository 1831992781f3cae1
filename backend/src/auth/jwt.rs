//! JWT token issuance and verification
//!
//! Tokens are HS256-signed with a server-held secret. Verification pins the
//! algorithm, so a token signed with anything else is rejected even if its
//! signature would check out under that other algorithm.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// The only algorithm tokens are signed and accepted with
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

const ACCESS_TOKEN_SUBJECT: &str = "access-token";

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "merchantID")]
    pub merchant_id: i64,
    pub email: String,
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token failures
#[derive(Error, Debug)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, malformed, expired or not yet valid
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    /// Signature checked out but the payload is not shaped like [`Claims`]
    #[error("token claims have an unexpected shape: {0}")]
    MalformedClaims(serde_json::Error),

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Pre-computed JWT keys, shared cheaply between clones of the service
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// JWT service for token operations
///
/// Create once at startup and share through `AppState`; cloning is cheap.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    issuer: Arc<str>,
    expiry_secs: i64,
    validation: Arc<Validation>,
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("expiry_secs", &self.expiry_secs)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str, issuer: &str, expiry_secs: i64) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

        Self {
            keys: JwtKeys::new(secret),
            issuer: Arc::from(issuer),
            expiry_secs,
            validation: Arc::new(validation),
        }
    }

    /// Sign a token asserting the caller's identity
    pub fn issue(
        &self,
        user_id: i64,
        email: &str,
        merchant_id: i64,
    ) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.expiry_secs);

        let claims = Claims {
            user_id,
            merchant_id,
            email: email.to_string(),
            iss: self.issuer.to_string(),
            sub: ACCESS_TOKEN_SUBJECT.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|e| {
                error!(error = %e, user_id, "Failed to sign access token");
                TokenError::Signing(e)
            })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // Decode untyped first so a shape mismatch is distinguishable from a
        // signature or expiry failure.
        let token_data = decode::<Map<String, Value>>(token, &self.keys.decoding, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                TokenError::Invalid(e)
            })?;

        serde_json::from_value(Value::Object(token_data.claims)).map_err(|e| {
            error!(error = %e, "Verified token carries unexpected claims");
            TokenError::MalformedClaims(e)
        })
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}
