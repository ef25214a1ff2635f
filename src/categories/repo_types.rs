use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Category record, returned to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}
