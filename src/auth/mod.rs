//! Bearer-token authentication.
//!
//! # Data Flow
//! ```text
//! Authorization header values
//!     → first "Bearer "-prefixed value
//!     → signature check against the signing key
//!     → expiry check (strictly before now = expired)
//!     → Identity { subject }, injected as X-Gateway-User-Id by the chain
//! ```
//!
//! # Design Decisions
//! - The verifier checks signatures only; expiry policy stays with the
//!   caller so the boundary case is decided in exactly one place
//! - A token whose expiration equals the current second is still valid
//! - Verification is pure CPU work; it never suspends
//! - The signing key never leaves this module

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderName};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header carrying the authenticated subject to backend services.
pub const X_GATEWAY_USER_ID: HeaderName = HeaderName::from_static("x-gateway-user-id");

const BEARER_PREFIX: &str = "Bearer ";

/// Claims decoded from a verified token. Never persisted; lifetime is the
/// single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identity).
    pub sub: String,
    /// Expiration (Unix timestamp, seconds).
    pub exp: i64,
}

/// Verification failure. Malformed structure, signature mismatch and
/// unsupported algorithms are indistinguishable to callers.
#[derive(Debug, Error)]
#[error("malformed token or invalid signature")]
pub struct VerifyError(#[source] jsonwebtoken::errors::Error);

/// Validates token signatures against the process-wide signing key.
pub struct ClaimsVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl ClaimsVerifier {
    /// Build a verifier over the symmetric signing key.
    pub fn new(key: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is the authentication filter's decision, not the verifier's.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Verify the signature and decode the claims.
    ///
    /// Pure function over the token and the signing key. The expiration is
    /// always returned when parsing succeeds so the caller can evaluate it.
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(VerifyError)
    }
}

/// Identity established by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject claim of the verified token.
    pub subject: String,
}

/// Authentication failure, mapped to gateway error codes at the boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No Authorization header, or none of its values is a bearer token.
    #[error("Authorization header does not exist")]
    MissingAuthorization,

    /// The token's expiration lies strictly in the past.
    #[error("Access token has expired")]
    TokenExpired,

    /// Signature or structural failure from the verifier.
    #[error(transparent)]
    InvalidToken(#[from] VerifyError),
}

impl AuthError {
    /// Gateway error code carried in the structured error body.
    pub fn error_code(&self) -> i32 {
        match self {
            AuthError::MissingAuthorization => 701,
            AuthError::TokenExpired => 702,
            AuthError::InvalidToken(_) => 999,
        }
    }
}

/// Run the authentication algorithm over the request headers.
///
/// On success the caller must set [`X_GATEWAY_USER_ID`] to the returned
/// subject on the forwarded request. This function never mutates anything
/// itself.
pub fn authenticate(headers: &HeaderMap, verifier: &ClaimsVerifier) -> Result<Identity, AuthError> {
    authenticate_at(headers, verifier, Utc::now())
}

/// Authentication against an explicit clock.
pub fn authenticate_at(
    headers: &HeaderMap,
    verifier: &ClaimsVerifier,
    now: DateTime<Utc>,
) -> Result<Identity, AuthError> {
    let bearer = headers
        .get_all(AUTHORIZATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(BEARER_PREFIX))
        .ok_or(AuthError::MissingAuthorization)?;

    let token = bearer[BEARER_PREFIX.len()..].trim();
    let claims = verifier.verify(token)?;

    if claims.exp < now.timestamp() {
        return Err(AuthError::TokenExpired);
    }

    Ok(Identity {
        subject: claims.sub,
    })
}
