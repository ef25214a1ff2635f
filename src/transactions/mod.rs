pub mod dto;
pub mod filter;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use filter::{SortOrder, TransactionFilter, TransactionQuery};
pub use repo_types::{Transaction, TransactionType};

/// Transaction CRUD and listing. Must be mounted behind the auth layer.
pub fn router() -> Router<AppState> {
    handlers::transaction_routes()
}
