// handlers/protected/iot.rs - /api/get-* readings and /api/toggle-* switches

use axum::response::Json;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::iot::{Device, Reading};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::ws::WsMessage;

/// GET /api/get-{initial-state,current-data,historical-data}
///
/// Not an axum handler by itself: the router binds `reading` per path.
pub async fn reading(state: AppState, reading: Reading) -> Result<Json<Value>, ApiError> {
    let plaintext = state.gateway.fetch(reading).await?;
    Ok(Json(json!({
        "success": true,
        "data": String::from_utf8_lossy(&plaintext),
    })))
}

/// GET /api/toggle-{auto,belt,fan,bulb,feeder,water}
pub async fn toggle(state: AppState, user: AuthUser, device: Device) -> Result<Json<Value>, ApiError> {
    let new_state = state.gateway.toggle(device).await?;
    let new_state = String::from_utf8_lossy(&new_state);
    tracing::info!("{} toggled {} -> {}", user.username, device.name(), new_state);

    // Echo to the user's open dashboard, if any
    let update = WsMessage::new("device", format!("{}:{}", device.name(), new_state));
    if !state.clients.send_to(&user.username, update).await {
        tracing::debug!("No live dashboard for {}", user.username);
    }

    Ok(Json(json!({
        "success": true,
        "new_state": new_state,
        "device": device.endpoint(),
    })))
}
