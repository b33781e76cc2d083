// handlers/public/auth.rs - POST /register, POST /login, POST /logout

use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::form::FormFields;
use crate::auth::{auth_cookie, clear_auth_cookie, hash_password, validate_registration, verify_password};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::authenticate;
use crate::state::AppState;

const USERNAME_TAKEN: &str = "Username already taken";
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /register - create an account with the farm's registration key
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    form: FormFields,
) -> Result<Response, ApiError> {
    if authenticate(&state.tokens, &jar).is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = form.get("username");
    let password = form.get("password");
    let security = &state.config.security;

    if let Err(e) = validate_registration(
        username,
        password,
        form.get("key"),
        &security.registration_key,
        security.min_password_length,
    ) {
        tracing::warn!("Registration rejected: {}", e);
        return Err(ApiError::bad_request(e.to_string()));
    }

    let users = state.db.users();
    if users.exists(username).await? {
        return Err(ApiError::bad_request(USERNAME_TAKEN));
    }

    let hashed = hash_password(password, security.bcrypt_cost)
        .await
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to hash password")
        })?;

    match users.create(username, &hashed).await {
        Ok(id) => tracing::info!("Registered user {} (id {})", username, id),
        // Lost a race with a concurrent registration
        Err(DatabaseError::Conflict(_)) => return Err(ApiError::bad_request(USERNAME_TAKEN)),
        Err(e) => {
            tracing::error!("Failed to create user {}: {}", username, e);
            return Err(ApiError::internal_server_error("Failed to create user account"));
        }
    }

    signed_in(&state, jar, username)
}

/// POST /login - exchange username and password for a session cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: FormFields,
) -> Result<Response, ApiError> {
    if authenticate(&state.tokens, &jar).is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let username = form.get("username");
    let password = form.get("password");

    let Some(user) = state.db.users().find_by_username(username).await? else {
        tracing::warn!("Login failed for unknown user {}", username);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let matches = verify_password(password, &user.password)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Stored hash for {} is unusable: {}", username, e);
            false
        });
    if !matches {
        tracing::warn!("Login failed for {}: wrong password", username);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    tracing::info!("User {} logged in", username);
    signed_in(&state, jar, username)
}

/// POST /logout - drop the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(clear_auth_cookie(state.config.security.cookie_secure));
    (jar, Json(json!({ "success": true, "message": "Logged out" })))
}

fn signed_in(state: &AppState, jar: CookieJar, username: &str) -> Result<Response, ApiError> {
    let issued = state.tokens.issue(username).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Failed to generate token")
    })?;

    let jar = jar.add(auth_cookie(&issued, state.config.security.cookie_secure));
    Ok((jar, Redirect::to("/")).into_response())
}
