pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo_types::Category;

/// Category CRUD. Must be mounted behind the auth layer.
pub fn router() -> Router<AppState> {
    handlers::category_routes()
}
