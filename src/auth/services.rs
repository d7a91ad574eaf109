use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    jwt::JwtKeys,
    password::{burn_verify, hash_password, verify_password},
    repo::UserRepo,
    repo_types::User,
};
use crate::{
    error::{AppError, AppResult},
    store::Store,
};

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> AppResult<(User, String)> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    let password_len = password.chars().count();
    if password_len < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password_len > MAX_PASSWORD_LEN {
        return Err(AppError::validation("Password too long"));
    }

    if store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(password)?;
    // A concurrent registration can still win the race; the unique index decides.
    let user = store
        .create_user(&email, &hash)
        .await
        .map_err(|e| e.conflict_as("Email already registered"))?;

    let token = keys.issue(user.id)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((user, token))
}

pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> AppResult<(User, String)> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let Some(user) = store.find_user_by_email(&email).await? else {
        burn_verify(password);
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthenticated);
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthenticated);
    }

    let token = keys.issue(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, token))
}

pub async fn me(store: &dyn Store, user_id: Uuid) -> AppResult<User> {
    // A valid token for a deleted account is no longer a valid session.
    store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::Unauthenticated)
}
