use sqlx::PgPool;
use time::OffsetDateTime;

use super::{
    filter::{count_query, page_query, TransactionFilter, TransactionQuery},
    repo_types::{Transaction, TransactionRow, TransactionType},
};

/// Column values written by insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub kind: TransactionType,
    pub category_id: i64,
    pub date: OffsetDateTime,
}

fn decode(row: TransactionRow) -> Result<Transaction, sqlx::Error> {
    Transaction::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn decode_all(rows: Vec<TransactionRow>) -> Result<Vec<Transaction>, sqlx::Error> {
    rows.into_iter().map(decode).collect()
}

pub async fn count(db: &PgPool, user_id: i64, filter: &TransactionFilter) -> Result<i64, sqlx::Error> {
    let mut qb = count_query(user_id, filter);
    qb.build_query_scalar::<i64>().fetch_one(db).await
}

pub async fn fetch_page(
    db: &PgPool,
    user_id: i64,
    query: &TransactionQuery,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let mut qb = page_query(user_id, query);
    let rows = qb.build_query_as::<TransactionRow>().fetch_all(db).await?;
    decode_all(rows)
}

pub async fn find(db: &PgPool, user_id: i64, id: i64) -> Result<Option<Transaction>, sqlx::Error> {
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, user_id, amount, type, category_id, date
        FROM transactions
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    row.map(decode).transpose()
}

pub async fn insert(db: &PgPool, user_id: i64, tx: &NewTransaction) -> Result<Transaction, sqlx::Error> {
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transactions (user_id, amount, type, category_id, date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, amount, type, category_id, date
        "#,
    )
    .bind(user_id)
    .bind(tx.amount)
    .bind(tx.kind.as_str())
    .bind(tx.category_id)
    .bind(tx.date)
    .fetch_one(db)
    .await?;
    decode(row)
}

/// Overwrites every column of the user's transaction `id`. `None` when no
/// such row is owned by `user_id`.
pub async fn update(
    db: &PgPool,
    user_id: i64,
    id: i64,
    tx: &NewTransaction,
) -> Result<Option<Transaction>, sqlx::Error> {
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"
        UPDATE transactions
        SET amount = $1, type = $2, category_id = $3, date = $4
        WHERE id = $5 AND user_id = $6
        RETURNING id, user_id, amount, type, category_id, date
        "#,
    )
    .bind(tx.amount)
    .bind(tx.kind.as_str())
    .bind(tx.category_id)
    .bind(tx.date)
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    row.map(decode).transpose()
}

pub async fn delete(db: &PgPool, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
