// handlers/protected/ai.rs - /api/ai/* disease detection

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::{lookup_disease, AiHealthStatus, ImageUpload, PredictionResponse, AVAILABLE_DISEASES_HINT, DISEASES};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const AI_UNAVAILABLE: &str = "AI service is currently unavailable";
const NO_IMAGE: &str = "No image file provided";
const NO_IMAGE_HINT: &str = "Please upload an image file using the 'image' form field";

/// GET /api/ai/health
pub async fn ai_health(State(state): State<AppState>) -> ApiResult<AiHealthStatus> {
    match state.ai.health().await {
        Ok(health) => Ok(ApiResponse::success(health)),
        Err(e) if e.is_unavailable() => {
            tracing::warn!("AI health check failed: {}", e);
            Err(ApiError::service_unavailable(AI_UNAVAILABLE, e.details()))
        }
        Err(e) => {
            tracing::error!("AI health response unusable: {}", e);
            Err(ApiError::internal_with_details(e.unusable_message(), e.details()))
        }
    }
}

/// POST /api/ai/predict-disease - multipart field `image`
pub async fn predict_disease(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<PredictionResponse> {
    let upload = match multipart {
        Ok(multipart) => image_field(multipart).await?,
        Err(e) => {
            tracing::debug!("predict-disease without multipart body: {}", e);
            None
        }
    };
    let Some(upload) = upload else {
        return Err(ApiError::bad_request_with_hint(NO_IMAGE, NO_IMAGE_HINT));
    };

    upload
        .validate(state.config.ai.max_upload_bytes)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    match state.ai.predict(upload).await {
        Ok(prediction) => Ok(ApiResponse::success(prediction)),
        Err(e) => {
            tracing::error!("Disease prediction failed: {}", e);
            Err(ApiError::internal_with_details("Failed to process image", e.details()))
        }
    }
}

async fn image_field(mut multipart: Multipart) -> Result<Option<ImageUpload>, ApiError> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        ApiError::bad_request_with_hint(format!("{}: {}", NO_IMAGE, e), NO_IMAGE_HINT)
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("image").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(bad_form)?;

        return Ok(Some(ImageUpload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

#[derive(Debug, Deserialize)]
pub struct DiseaseQuery {
    pub disease: Option<String>,
}

/// GET /api/ai/disease-info[?disease=name]
pub async fn disease_info(Query(query): Query<DiseaseQuery>) -> Result<Json<Value>, ApiError> {
    let disease = query.disease.unwrap_or_default();
    if disease.is_empty() {
        let catalog: serde_json::Map<String, Value> = DISEASES
            .iter()
            .map(|(key, info)| (key.to_string(), json!(info)))
            .collect();
        return Ok(Json(json!({ "success": true, "diseases": catalog })));
    }

    match lookup_disease(&disease) {
        Some(info) => Ok(Json(json!({
            "success": true,
            "disease": disease,
            "info": info,
        }))),
        None => Err(ApiError::not_found_with_hint(
            "Disease information not found",
            AVAILABLE_DISEASES_HINT,
        )),
    }
}
