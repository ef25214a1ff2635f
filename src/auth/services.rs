use sqlx::PgPool;
use tracing::{info, instrument, warn};

use super::{
    error::AuthError,
    jwt::JwtKeys,
    password::{hash_password, verify_password, MIN_PASSWORD_LEN},
    repo_types::User,
};
use crate::error::{ApiError, ApiResult};

pub const PASSWORD_TOO_SHORT: &str = "password must be at least 6 characters";
pub const CREDENTIALS_REQUIRED: &str = "username and password are required";
pub const USERNAME_TAKEN: &str = "username already exists";

/// Registration policy. The length check runs first so a short password is
/// reported the same way whatever the username.
pub(crate) fn validate_registration(username: &str, password: &str) -> ApiResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(PASSWORD_TOO_SHORT));
    }
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation(CREDENTIALS_REQUIRED));
    }
    Ok(())
}

#[instrument(skip(db, password))]
pub async fn register(db: &PgPool, username: &str, password: &str) -> ApiResult<User> {
    let username = username.trim();
    validate_registration(username, password)?;

    let hash = hash_password(password)?;
    match User::create(db, username, &hash).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            warn!(username, "username already registered");
            Err(ApiError::conflict(USERNAME_TAKEN))
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks credentials and mints a token. Unknown usernames and wrong
/// passwords produce the same error.
#[instrument(skip(db, keys, password))]
pub async fn login(db: &PgPool, keys: &JwtKeys, username: &str, password: &str) -> ApiResult<String> {
    let Some(user) = User::find_by_username(db, username.trim()).await? else {
        warn!(username, "login unknown username");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = keys.issue(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(token)
}
