//! Path extractors.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::error::ApiError;

/// Numeric `{id}` path segment. Anything else is a 400, not a 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub u64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadId(rejection.body_text()))?;
        raw.trim()
            .parse()
            .map(Self)
            .map_err(|_| ApiError::BadId(raw))
    }
}
