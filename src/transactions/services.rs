//! Transaction store. Listing goes through [`TransactionQuery`]; writes go
//! through [`TransactionInput`]. Every call is scoped to the caller.

use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::{
    dto::{TransactionPage, TransactionRequest},
    filter::TransactionQuery,
    repo::{self, NewTransaction},
    repo_types::{Transaction, TransactionType},
};
use crate::{
    auth::AuthorizedContext,
    categories,
    error::{ApiError, ApiResult},
};

pub const AMOUNT_NOT_POSITIVE: &str = "amount must be positive";
pub const INVALID_TYPE: &str = "type must be 'income' or 'expense'";
pub const CATEGORY_REQUIRED: &str = "category_id is required and must be positive";
pub const CATEGORY_NOT_OWNED: &str = "category does not exist or does not belong to user";

/// A validated create/update payload. `date` stays optional until the write.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub amount: f64,
    pub kind: TransactionType,
    pub category_id: i64,
    pub date: Option<OffsetDateTime>,
}

impl TryFrom<TransactionRequest> for TransactionInput {
    type Error = ApiError;

    fn try_from(req: TransactionRequest) -> Result<Self, Self::Error> {
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(ApiError::validation(AMOUNT_NOT_POSITIVE));
        }
        let kind = req
            .kind
            .parse::<TransactionType>()
            .map_err(|_| ApiError::validation(INVALID_TYPE))?;
        if req.category_id <= 0 {
            return Err(ApiError::validation(CATEGORY_REQUIRED));
        }
        Ok(Self {
            amount: req.amount,
            kind,
            category_id: req.category_id,
            date: req.date,
        })
    }
}

impl TransactionInput {
    fn into_row(self) -> NewTransaction {
        NewTransaction {
            amount: self.amount,
            kind: self.kind,
            category_id: self.category_id,
            date: self.date.unwrap_or_else(OffsetDateTime::now_utc),
        }
    }
}

async fn ensure_category_owned(db: &PgPool, ctx: &AuthorizedContext, category_id: i64) -> ApiResult<()> {
    if !categories::services::exists(db, ctx, category_id).await? {
        warn!(user_id = ctx.user_id, category_id, "category not owned by caller");
        return Err(ApiError::validation(CATEGORY_NOT_OWNED));
    }
    Ok(())
}

/// The category can vanish between the ownership probe and the write; the
/// foreign key then reports it.
fn map_write_error(err: sqlx::Error) -> ApiError {
    match err {
        sqlx::Error::Database(e) if e.is_foreign_key_violation() => {
            ApiError::validation(CATEGORY_NOT_OWNED)
        }
        other => other.into(),
    }
}

#[instrument(skip(db))]
pub async fn list(db: &PgPool, ctx: &AuthorizedContext, query: &TransactionQuery) -> ApiResult<TransactionPage> {
    if let Some(category_id) = query.filter.category_id {
        ensure_category_owned(db, ctx, category_id).await?;
    }

    let total = repo::count(db, ctx.user_id, &query.filter).await?;
    let transactions = repo::fetch_page(db, ctx.user_id, query).await?;
    debug!(
        user_id = ctx.user_id,
        total,
        returned = transactions.len(),
        "transactions listed"
    );
    Ok(TransactionPage { transactions, total })
}

pub async fn get(db: &PgPool, ctx: &AuthorizedContext, id: i64) -> ApiResult<Option<Transaction>> {
    Ok(repo::find(db, ctx.user_id, id).await?)
}

#[instrument(skip(db))]
pub async fn create(db: &PgPool, ctx: &AuthorizedContext, input: TransactionInput) -> ApiResult<Transaction> {
    ensure_category_owned(db, ctx, input.category_id).await?;

    let tx = repo::insert(db, ctx.user_id, &input.into_row())
        .await
        .map_err(map_write_error)?;
    info!(user_id = ctx.user_id, transaction_id = tx.id, "transaction created");
    Ok(tx)
}

#[instrument(skip(db))]
pub async fn update(
    db: &PgPool,
    ctx: &AuthorizedContext,
    id: i64,
    input: TransactionInput,
) -> ApiResult<Option<Transaction>> {
    ensure_category_owned(db, ctx, input.category_id).await?;

    let updated = repo::update(db, ctx.user_id, id, &input.into_row())
        .await
        .map_err(map_write_error)?;
    if updated.is_some() {
        info!(user_id = ctx.user_id, transaction_id = id, "transaction updated");
    }
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &PgPool, ctx: &AuthorizedContext, id: i64) -> ApiResult<bool> {
    let deleted = repo::delete(db, ctx.user_id, id).await?;
    if deleted {
        info!(user_id = ctx.user_id, transaction_id = id, "transaction deleted");
    }
    Ok(deleted)
}
