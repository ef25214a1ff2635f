use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
mod error;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use error::AuthError;
pub use extractors::AuthorizedContext;
pub use jwt::JwtKeys;

/// Public routes: registration and login.
pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
