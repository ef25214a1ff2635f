use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::Transaction;

/// Raw query string of `GET /transactions`. Everything stays a string so
/// each parameter can be rejected with its own message.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category_id: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Body of `POST /transactions` and `PUT /transactions/:id`. Missing fields
/// fall through to validation rather than failing deserialization.
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    #[serde(default)]
    pub amount: f64,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
}
