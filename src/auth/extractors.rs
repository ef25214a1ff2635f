use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::error::AuthError;
use crate::error::ApiError;

/// The authenticated caller. Every category and transaction store call takes
/// one, so ownership scoping cannot be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizedContext {
    pub user_id: i64,
}

/// Reads the context inserted by [`super::middleware::require_auth`]. Routes
/// outside the auth layer get a 401.
#[async_trait]
impl<S> FromRequestParts<S> for AuthorizedContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthorizedContext>()
            .copied()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
