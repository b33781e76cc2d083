// handlers/public/health.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Tokkatot Middleware",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/register, /login, /logout (public)",
                "profile": "/api/profile (protected)",
                "iot": "/api/get-*, /api/toggle-* (protected)",
                "ai": "/api/ai/predict-disease, /api/ai/health, /api/ai/disease-info (protected)",
                "ws": "/ws (protected)",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
        }
    }
}
