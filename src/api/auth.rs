//! Bearer token issuing and verification.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use qms_lib::{Caller, Claims, CredentialVerifier, QmsError, User};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::ApiError;

/// Upper bound on token lifetime; larger configured values are clamped.
const MAX_TTL_HOURS: i64 = 24 * 365 * 10;

/// Claims as carried on the wire: identity plus validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub identity: Claims,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    #[must_use]
    pub fn new(identity: Claims, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            identity,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// HS256 token handler.
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtAuth {
    #[must_use]
    pub fn new(secret: &[u8], ttl_hours: u64) -> Self {
        let hours = i64::try_from(ttl_hours)
            .unwrap_or(MAX_TTL_HOURS)
            .min(MAX_TTL_HOURS);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl: Duration::hours(hours),
        }
    }

    /// Sign arbitrary claims with this handler's key.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be serialized or signed.
    pub fn encode(&self, claims: &TokenClaims) -> jsonwebtoken::errors::Result<String> {
        encode(&Header::default(), claims, &self.encoding_key)
    }

    /// Mint a token for `user`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue(&self, user: &User) -> jsonwebtoken::errors::Result<String> {
        let identity = Claims {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: Some(user.role),
        };
        self.encode(&TokenClaims::new(identity, self.ttl))
    }
}

impl CredentialVerifier for JwtAuth {
    fn verify(&self, token: &str) -> qms_lib::Result<Claims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.identity)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                QmsError::InvalidCredential {
                    reason: e.to_string(),
                }
            })
    }
}

/// Token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor for an authenticated caller with a role.
///
/// Rejects with 401 when the header is absent or the role claim is
/// missing, 403 when the token does not verify.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Caller);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(&parts.headers).ok_or(QmsError::MissingCredential)?;
        let claims = state.tokens.verify(token)?;
        let caller = Caller::try_from(claims)?;
        Ok(Self(caller))
    }
}
