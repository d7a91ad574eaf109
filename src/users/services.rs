use uuid::Uuid;

use crate::{
    auth::{repo::UserRepo, repo_types::User, services::normalize_email},
    error::{AppError, AppResult},
    store::Store,
};

pub const MIN_PREFIX_LEN: usize = 2;
pub const SEARCH_LIMIT: usize = 10;

/// Email-prefix lookup used for invitation autocomplete. The caller is left out.
pub async fn search(store: &dyn Store, caller: Uuid, prefix: &str) -> AppResult<Vec<User>> {
    let prefix = normalize_email(prefix);
    if prefix.chars().count() < MIN_PREFIX_LEN {
        return Err(AppError::validation(format!(
            "Search term must be at least {MIN_PREFIX_LEN} characters"
        )));
    }
    let mut users = store
        .search_users_by_email(&prefix, SEARCH_LIMIT as i64 + 1)
        .await?;
    users.retain(|u| u.id != caller);
    users.truncate(SEARCH_LIMIT);
    Ok(users)
}
