// handlers/protected/profile.rs - GET/POST /api/profile

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::database::{ProfileUpdate, UserProfile};
use crate::error::ApiError;
use crate::middleware::auth::UNAUTHORIZED_MESSAGE;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Row id for the cookie's user. A token for a deleted account is treated
/// like no token at all.
async fn current_user_id(state: &AppState, user: &AuthUser) -> Result<i64, ApiError> {
    match state.db.users().id_for(&user.username).await? {
        Some(id) => Ok(id),
        None => {
            tracing::warn!("Valid token for unknown user {}", user.username);
            Err(ApiError::unauthorized(UNAUTHORIZED_MESSAGE))
        }
    }
}

/// GET /api/profile - returns the bare profile object the settings page reads
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = current_user_id(&state, &user).await?;
    let profile = state.db.profiles().get(user_id).await?;
    Ok(Json(profile))
}

/// POST /api/profile - `user_id` always comes from the token, never the body
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(update) = body.map_err(|e| {
        tracing::debug!("Bad profile body: {}", e);
        ApiError::bad_request("Invalid request body")
    })?;

    let user_id = current_user_id(&state, &user).await?;
    state.db.profiles().upsert(user_id, &update).await?;

    tracing::info!("Profile updated for {}", user.username);
    Ok(Json(json!({ "message": "Profile updated successfully" })))
}
