use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::{error::AuthError, extractors::AuthorizedContext, jwt::JwtKeys};
use crate::error::ApiError;

/// Route layer for protected routers: verifies the bearer token and stores
/// the resulting [`AuthorizedContext`] in the request extensions.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let ctx = authenticate(&keys, header)?;
    debug!(user_id = ctx.user_id, "request authenticated");

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Resolves an `Authorization` header value to the calling user.
pub fn authenticate(keys: &JwtKeys, header: Option<&str>) -> Result<AuthorizedContext, AuthError> {
    let raw = header
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingToken)?;
    let user_id = keys.verify(bearer_token(raw))?;
    Ok(AuthorizedContext { user_id })
}

/// The `Bearer ` scheme is optional; a bare token is accepted as-is.
fn bearer_token(raw: &str) -> &str {
    raw.strip_prefix("Bearer ").unwrap_or(raw)
}
