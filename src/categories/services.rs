//! Category store: ownership-scoped CRUD plus the in-use guard on delete.

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use super::{repo, repo_types::Category};
use crate::{
    auth::AuthorizedContext,
    error::{ApiError, ApiResult},
};

pub const NAME_REQUIRED: &str = "category name is required";
pub const CATEGORY_IN_USE: &str = "category is used in transactions";

fn validated_name(name: &str) -> ApiResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::validation(NAME_REQUIRED));
    }
    Ok(name)
}

#[instrument(skip(db))]
pub async fn create(db: &PgPool, ctx: &AuthorizedContext, name: &str) -> ApiResult<Category> {
    let name = validated_name(name)?;
    let category = repo::insert(db, ctx.user_id, name).await?;
    info!(user_id = ctx.user_id, category_id = category.id, "category created");
    Ok(category)
}

/// `None` both when the id does not exist and when another user owns it.
pub async fn get(db: &PgPool, ctx: &AuthorizedContext, id: i64) -> ApiResult<Option<Category>> {
    Ok(repo::find(db, ctx.user_id, id).await?)
}

pub async fn list(db: &PgPool, ctx: &AuthorizedContext) -> ApiResult<Vec<Category>> {
    Ok(repo::list_by_user(db, ctx.user_id).await?)
}

pub async fn exists(db: &PgPool, ctx: &AuthorizedContext, id: i64) -> ApiResult<bool> {
    Ok(repo::exists(db, ctx.user_id, id).await?)
}

/// Returns `false` when no category with `id` belongs to the caller.
#[instrument(skip(db))]
pub async fn update(db: &PgPool, ctx: &AuthorizedContext, id: i64, name: &str) -> ApiResult<bool> {
    let name = validated_name(name)?;
    let updated = repo::rename(db, ctx.user_id, id, name).await?;
    if updated {
        info!(user_id = ctx.user_id, category_id = id, "category renamed");
    }
    Ok(updated)
}

/// Refuses while any of the caller's transactions reference the category.
/// The reference count and the delete are separate statements.
#[instrument(skip(db))]
pub async fn delete(db: &PgPool, ctx: &AuthorizedContext, id: i64) -> ApiResult<bool> {
    let references = repo::count_references(db, ctx.user_id, id).await?;
    if references > 0 {
        warn!(user_id = ctx.user_id, category_id = id, references, "category still referenced");
        return Err(ApiError::conflict(CATEGORY_IN_USE));
    }

    let deleted = repo::delete(db, ctx.user_id, id).await?;
    if deleted {
        info!(user_id = ctx.user_id, category_id = id, "category deleted");
    }
    Ok(deleted)
}
