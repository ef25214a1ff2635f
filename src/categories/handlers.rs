use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{dto::CategoryRequest, repo_types::Category, services};
use crate::{
    auth::AuthorizedContext,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    state::AppState,
};

const NOT_FOUND: &str = "category not found";

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiJson(payload): ApiJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = services::create(&state.db, &ctx, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(services::list(&state.db, &ctx).await?))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Category>> {
    services::get(&state.db, &ctx, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(NOT_FOUND))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    if !services::update(&state.db, &ctx, id, &payload.name).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    Ok(Json(Category {
        id,
        user_id: ctx.user_id,
        name: payload.name.trim().to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    ctx: AuthorizedContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !services::delete(&state.db, &ctx, id).await? {
        return Err(ApiError::NotFound(NOT_FOUND));
    }
    Ok(StatusCode::NO_CONTENT)
}
