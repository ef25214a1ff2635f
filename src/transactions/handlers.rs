use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ListTransactionsParams, TransactionPage, TransactionRequest},
    filter::TransactionQuery,
    repo_types::Transaction,
    services::{self, TransactionInput},
};
use crate::{
    auth::AuthorizedContext,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

const NOT_FOUND: &str = "transaction not found";

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiQuery(params): ApiQuery<ListTransactionsParams>,
) -> ApiResult<Json<TransactionPage>> {
    let query = TransactionQuery::parse(params)?;
    Ok(Json(services::list(&state.db, &ctx, &query).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiJson(payload): ApiJson<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let input = TransactionInput::try_from(payload)?;
    let tx = services::create(&state.db, &ctx, input).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

#[instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Transaction>> {
    services::get(&state.db, &ctx, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

/// Unknown ids are reported before the body is validated.
#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<TransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    if services::get(&state.db, &ctx, id).await?.is_none() {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    let input = TransactionInput::try_from(payload)?;
    services::update(&state.db, &ctx, id, input)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !services::delete(&state.db, &ctx, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    Ok(StatusCode::NO_CONTENT)
}
