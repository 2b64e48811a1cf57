use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::password::{hash_password, verify_password};
use crate::users::repo::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration: presence checks, email shape, combined username-or-email
/// uniqueness probe, then hash and insert.
pub async fn register(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let username = username.trim();
    let email = email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("error.required_fields"));
    }
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::Validation("error.invalid_email"));
    }

    let taken = User::exists_by_username_or_email(&state.db, username, &email)
        .await
        .map_err(|e| {
            error!(error = %e, "uniqueness check failed");
            ApiError::Internal("error.error_registering")
        })?;
    if taken {
        warn!(%username, %email, "username or email already registered");
        return Err(ApiError::Conflict("error.user_exists"));
    }

    let hash = hash_password(password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal("error.error_registering")
    })?;

    let user = User::create(&state.db, username, &email, &hash)
        .await
        .map_err(|e| {
            error!(error = %e, "create user failed");
            ApiError::Internal("error.error_registering")
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Login: one lookup covering username and email, then hash comparison.
/// Unknown identifier and wrong password answer identically.
pub async fn login(
    state: &AppState,
    identifier: &str,
    password: &str,
) -> Result<(User, String), ApiError> {
    let identifier = identifier.trim();

    if identifier.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("error.required_fields"));
    }

    let user = User::find_by_identifier(&state.db, identifier)
        .await
        .map_err(|e| {
            error!(error = %e, "find_by_identifier failed");
            ApiError::Internal("error.error_logging_in")
        })?
        .ok_or_else(|| {
            warn!(%identifier, "login with unknown identifier");
            ApiError::Authentication("error.invalid_credentials")
        })?;

    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::Internal("error.error_logging_in")
    })?;
    if !ok {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Authentication("error.invalid_credentials"));
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal("error.error_logging_in")
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok((user, token))
}
